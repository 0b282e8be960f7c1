//! Redis-backed cache repository
//!
//! Expiry is delegated to Redis TTLs; no expiry bookkeeping happens here.
//! Every process connected to the same Redis database shares the same
//! revocation state.

use async_trait::async_trait;
use tk_core::errors::RepositoryError;
use tk_core::repositories::{positive_expiration, CacheRepository};
use tk_shared::config::{RedisConfig, StorageKind};
use tk_shared::utils::time::Expiration;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// Cache repository storing records in Redis
#[derive(Clone, Debug)]
pub struct RedisCacheRepository {
    client: RedisClient,
}

impl RedisCacheRepository {
    /// Connect to Redis and build a repository
    pub async fn connect(config: RedisConfig) -> Result<Self, InfrastructureError> {
        Ok(Self::from_client(RedisClient::new(config).await?))
    }

    /// Build a repository over an existing client
    pub fn from_client(client: RedisClient) -> Self {
        Self { client }
    }

    /// Underlying Redis client
    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    /// Connection settings
    pub fn config(&self) -> &RedisConfig {
        self.client.config()
    }
}

#[async_trait]
impl CacheRepository for RedisCacheRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        self.client
            .get(key)
            .await
            .map_err(|e| e.into_repository_error("get"))
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        expiration: Option<Expiration>,
    ) -> Result<(), RepositoryError> {
        let expiry_seconds = positive_expiration(expiration)?;
        self.client
            .set(key, value, expiry_seconds)
            .await
            .map_err(|e| e.into_repository_error("set"))
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.client
            .delete(key)
            .await
            .map(|_| ())
            .map_err(|e| e.into_repository_error("delete"))
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Redis
    }
}
