//! Redis cache client implementation
//!
//! Thin async wrapper over a multiplexed Redis connection providing the
//! key/value/TTL primitives the Redis repository delegates to. Operations are
//! attempted once; reconnection and pooling are left to the `redis` crate.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tk_shared::config::{storage::mask_url, RedisConfig};
use tracing::{debug, error, info, warn};

use crate::InfrastructureError;

/// Redis cache client over a multiplexed connection
///
/// Cloning is cheap; clones share the underlying connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: RedisConfig,
}

impl RedisClient {
    /// Connect to the server described by `config`
    ///
    /// # Arguments
    /// * `config` - Redis connection settings
    ///
    /// # Returns
    /// * `Ok(RedisClient)` - Connected client
    /// * `Err(InfrastructureError::Config)` - The connection URL is invalid
    /// * `Err(InfrastructureError::Cache)` - The server could not be reached
    pub async fn new(config: RedisConfig) -> Result<Self, InfrastructureError> {
        let url = config.connection_url();
        info!("Creating Redis client with URL: {}", mask_url(&url));

        let client = Client::open(url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = client.get_multiplexed_async_connection().await.map_err(|e| {
            error!("Failed to connect to Redis at {}: {}", mask_url(&url), e);
            InfrastructureError::Cache(e)
        })?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    /// Configuration this client was created from
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    /// Store a value, with a TTL when `expiry_seconds` is given
    ///
    /// # Arguments
    /// * `key` - Cache key
    /// * `value` - Value to store
    /// * `expiry_seconds` - Time to live; `None` keeps the key until deleted
    pub async fn set(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: Option<u64>,
    ) -> Result<(), InfrastructureError> {
        let mut conn = self.connection.clone();

        let result = match expiry_seconds {
            Some(seconds) => conn.set_ex::<_, _, ()>(key, value, seconds).await,
            None => conn.set::<_, _, ()>(key, value).await,
        };

        result.map_err(|e| {
            error!("Failed to set Redis key: {}", e);
            InfrastructureError::Cache(e)
        })?;

        debug!(expiry_seconds = ?expiry_seconds, "Stored Redis key");
        Ok(())
    }

    /// Get a value
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Key present
    /// * `Ok(None)` - Key absent or expired
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        let mut conn = self.connection.clone();

        let value = conn.get::<_, Option<String>>(key).await.map_err(|e| {
            error!("Failed to get Redis key: {}", e);
            InfrastructureError::Cache(e)
        })?;

        debug!(found = value.is_some(), "Looked up Redis key");
        Ok(value)
    }

    /// Delete a key
    ///
    /// # Returns
    /// * `Ok(true)` - The key was deleted
    /// * `Ok(false)` - The key did not exist
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let mut conn = self.connection.clone();

        let deleted = conn.del::<_, u32>(key).await.map_err(|e| {
            error!("Failed to delete Redis key: {}", e);
            InfrastructureError::Cache(e)
        })?;

        debug!(deleted = deleted > 0, "Deleted Redis key");
        Ok(deleted > 0)
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let mut conn = self.connection.clone();

        match redis::cmd("PING").query_async::<_, String>(&mut conn).await {
            Ok(response) if response == "PONG" => {
                debug!("Redis health check passed");
                Ok(true)
            }
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Get time-to-live for a key
    ///
    /// # Returns
    /// * `Ok(Some(seconds))` - Remaining lifetime
    /// * `Ok(None)` - Key has no expiry or does not exist
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let mut conn = self.connection.clone();

        let ttl = conn.ttl::<_, i64>(key).await.map_err(|e| {
            error!("Failed to get TTL for Redis key: {}", e);
            InfrastructureError::Cache(e)
        })?;

        // -1: no expiry, -2: missing key
        Ok((ttl >= 0).then_some(ttl))
    }
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
