//! # TokenKeep Core
//!
//! Token lifecycle management for revocable signed tokens.
//! This crate contains the claim-set and user types, the signing codec,
//! the storage repository interface, the lifecycle manager that ties them
//! together, and the error taxonomy shared by all of them.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
