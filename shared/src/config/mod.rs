//! Configuration module
//!
//! - `auth` - Signing secret, algorithm and default token lifetime
//! - `storage` - Storage backend selection and Redis connection settings
//! - `logging` - Log level and output format

pub mod auth;
pub mod logging;
pub mod storage;

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

// Re-export commonly used types
pub use auth::{find_expiration_field, AuthConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use storage::{RedisConfig, StorageConfig, StorageKind};

/// Complete configuration combining all sub-configurations
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Token signing configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Storage backend configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            auth: AuthConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }
}

/// Read and parse an environment variable, falling back to `default` when unset
pub(crate) fn env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Read an optional, non-empty environment variable
pub(crate) fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
