//! Storage backend selection
//!
//! The factory is created once by the composition root and holds at most
//! one repository per backend kind. Every `create` call for a kind returns
//! the same shared instance, so state written through one handle is visible
//! through every other handle in the process.

use std::fmt;
use std::sync::Arc;

use tk_core::repositories::CacheRepository;
use tk_shared::config::{RedisConfig, StorageConfig};
use tk_shared::utils::time::{Clock, SystemClock};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::memory_store::MemoryCacheRepository;
use super::redis_store::RedisCacheRepository;
use crate::InfrastructureError;

/// Builds and memoizes cache repositories
///
/// The first configuration seen for a kind wins. A later `create` with
/// different Redis settings still returns the original repository; a
/// warning is logged because the new settings are ignored.
pub struct RepositoryFactory {
    clock: Arc<dyn Clock>,
    memory: OnceCell<Arc<MemoryCacheRepository>>,
    redis: OnceCell<Arc<RedisCacheRepository>>,
}

impl RepositoryFactory {
    /// Create a factory whose memory repository uses the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a factory whose memory repository reads time from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            memory: OnceCell::new(),
            redis: OnceCell::new(),
        }
    }

    /// Repository for `config`, created on first use
    ///
    /// # Returns
    /// * `Ok(repository)` - Shared repository of the configured kind
    /// * `Err(InfrastructureError)` - Redis could not be reached on first use
    pub async fn create(
        &self,
        config: &StorageConfig,
    ) -> Result<Arc<dyn CacheRepository>, InfrastructureError> {
        let repository: Arc<dyn CacheRepository> = match config {
            StorageConfig::Memory => self.memory().await,
            StorageConfig::Redis(redis) => self.redis(redis).await?,
        };
        Ok(repository)
    }

    /// Repository for a storage-kind tag such as `"memory"` or `"redis"`
    ///
    /// `redis` is only used when the tag selects Redis. Unknown tags fail
    /// with [`ConfigError::UnknownStorageKind`](tk_shared::errors::ConfigError::UnknownStorageKind).
    pub async fn create_for_tag(
        &self,
        tag: &str,
        redis: RedisConfig,
    ) -> Result<Arc<dyn CacheRepository>, InfrastructureError> {
        let config = StorageConfig::from_tag(tag, redis)?;
        self.create(&config).await
    }

    /// The shared in-memory repository
    pub async fn memory(&self) -> Arc<MemoryCacheRepository> {
        self.memory
            .get_or_init(|| async {
                info!("Creating in-memory cache repository");
                Arc::new(MemoryCacheRepository::with_clock(self.clock.clone()))
            })
            .await
            .clone()
    }

    /// The shared Redis repository, connecting with `config` on first use
    pub async fn redis(
        &self,
        config: &RedisConfig,
    ) -> Result<Arc<RedisCacheRepository>, InfrastructureError> {
        let repository = self
            .redis
            .get_or_try_init(|| async {
                info!("Creating Redis cache repository: {}", config);
                RedisCacheRepository::connect(config.clone()).await.map(Arc::new)
            })
            .await?;

        if repository.config() != config {
            warn!(
                "Redis cache repository already exists; ignoring new settings {} (using {})",
                config,
                repository.config()
            );
        }

        Ok(repository.clone())
    }
}

impl Default for RepositoryFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RepositoryFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryFactory")
            .field("memory_initialized", &self.memory.initialized())
            .field("redis_initialized", &self.redis.initialized())
            .finish()
    }
}
