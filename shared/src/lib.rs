//! Shared utilities and common types for TokenKeep
//!
//! This crate provides common functionality used across all workspace members:
//! - Configuration types (authentication, storage, logging)
//! - Expiration normalization and the injectable clock
//! - Shared error types and the HTTP error body

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::storage::mask_url;
pub use config::{
    AppConfig, AuthConfig, LogFormat, LoggingConfig, RedisConfig, StorageConfig, StorageKind,
};
pub use errors::{ConfigError, ErrorResponse, InvalidDurationType};
pub use utils::time::{normalize, Clock, Expiration, ManualClock, SystemClock};
