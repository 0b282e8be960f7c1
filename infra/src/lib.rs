//! # Infrastructure Layer
//!
//! Concrete storage behind the [`CacheRepository`](tk_core::repositories::CacheRepository)
//! interface of the core crate.
//!
//! ## Architecture
//!
//! - **Memory**: process-local map with lazily enforced expiry
//! - **Redis**: networked store delegating expiry to Redis TTLs
//! - **Factory**: picks a backend from [`StorageConfig`](tk_shared::config::StorageConfig)
//!   and hands out one shared instance per backend kind

// Re-export core types for convenience
pub use tk_core::errors::*;

/// Cache module - Memory and Redis repositories and their factory
pub mod cache;

pub use cache::{MemoryCacheRepository, RedisCacheRepository, RedisClient, RepositoryFactory};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Invalid connection settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage configuration could not be resolved
    #[error(transparent)]
    Storage(#[from] ConfigError),

    /// Repository-level failure
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl InfrastructureError {
    /// Convert into a repository error tagged with the failed operation
    pub fn into_repository_error(self, operation: &'static str) -> RepositoryError {
        match self {
            InfrastructureError::Repository(error) => error,
            InfrastructureError::Cache(error) if is_connection_error(&error) => {
                RepositoryError::Connection {
                    message: error.to_string(),
                }
            }
            other => RepositoryError::Backend {
                operation,
                message: other.to_string(),
            },
        }
    }
}

impl From<InfrastructureError> for RepositoryError {
    fn from(error: InfrastructureError) -> Self {
        error.into_repository_error("connect")
    }
}

fn is_connection_error(error: &redis::RedisError) -> bool {
    error.is_io_error() || error.is_connection_refusal() || error.is_connection_dropped()
}
