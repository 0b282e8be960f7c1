//! Process-local cache repository
//!
//! Values and their expiry instants live in two maps guarded by one lock,
//! so a reader never sees a value without the expiry it was written with.
//!
//! Expiry is enforced lazily: an expired entry is removed the next time it
//! is read. There is no background sweeper, so entries that expire and are
//! never read again stay in memory until the process exits. Memory use
//! therefore grows with the number of tokens issued but never looked up.
//!
//! State is local to one process. Deployments running several processes
//! that must share revocation state need the Redis backend.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tk_core::errors::RepositoryError;
use tk_core::repositories::{positive_expiration, CacheRepository};
use tk_shared::config::StorageKind;
use tk_shared::utils::time::{Clock, Expiration, SystemClock};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct MemoryState {
    values: HashMap<String, String>,
    expirations: HashMap<String, DateTime<Utc>>,
}

impl MemoryState {
    fn remove(&mut self, key: &str) {
        self.values.remove(key);
        self.expirations.remove(key);
    }

    fn is_expired(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.expirations
            .get(key)
            .is_some_and(|expires_at| now > *expires_at)
    }
}

/// In-memory cache repository
///
/// Clones share the same state. Create one per process (the
/// [`RepositoryFactory`](super::RepositoryFactory) does this) and hand
/// clones or `Arc`s to every consumer.
#[derive(Clone)]
pub struct MemoryCacheRepository {
    state: Arc<RwLock<MemoryState>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCacheRepository {
    /// Create an empty repository using the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty repository reading time from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState::default())),
            clock,
        }
    }

    /// Number of stored values, including expired ones not yet read
    pub async fn len(&self) -> usize {
        self.state.read().await.values.len()
    }

    /// Whether no values are stored
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.values.is_empty()
    }

    /// Number of recorded expiry instants
    pub async fn tracked_expirations(&self) -> usize {
        self.state.read().await.expirations.len()
    }

    /// Absolute expiry instant recorded for `key`
    pub async fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.state.read().await.expirations.get(key).copied()
    }
}

impl Default for MemoryCacheRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryCacheRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCacheRepository")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CacheRepository for MemoryCacheRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let now = self.clock.now();
        {
            let state = self.state.read().await;
            if !state.is_expired(key, now) {
                return Ok(state.values.get(key).cloned());
            }
        }

        // Re-check under the write lock: a concurrent `set` may have refreshed the entry
        let mut state = self.state.write().await;
        if state.is_expired(key, now) {
            state.remove(key);
            debug!("Evicted expired memory cache entry");
            return Ok(None);
        }
        Ok(state.values.get(key).cloned())
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        expiration: Option<Expiration>,
    ) -> Result<(), RepositoryError> {
        let expires_at = positive_expiration(expiration)?.map(|seconds| {
            i64::try_from(seconds)
                .ok()
                .and_then(Duration::try_seconds)
                .and_then(|lifetime| self.clock.now().checked_add_signed(lifetime))
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        });

        let mut state = self.state.write().await;
        state.values.insert(key.to_string(), value.to_string());
        match expires_at {
            Some(expires_at) => {
                state.expirations.insert(key.to_string(), expires_at);
            }
            None => {
                state.expirations.remove(key);
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.state.write().await.remove(key);
        Ok(())
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Memory
    }
}
