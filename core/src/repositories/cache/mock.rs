//! Mock implementation of CacheRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tk_shared::config::StorageKind;
use tk_shared::utils::time::Expiration;
use tokio::sync::RwLock;

use crate::errors::RepositoryError;

use super::r#trait::{positive_expiration, CacheRepository};

/// A stored value and the lifetime it was written with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockEntry {
    pub value: String,
    pub expiration_seconds: Option<u64>,
}

/// Mock cache repository for testing
///
/// Records lifetimes without enforcing them, and can be told to fail reads
/// or writes to exercise error paths.
#[derive(Clone, Default)]
pub struct MockCacheRepository {
    entries: Arc<RwLock<HashMap<String, MockEntry>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MockCacheRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set` and `delete` fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Stored entry, bypassing failure injection
    pub async fn entry(&self, key: &str) -> Option<MockEntry> {
        self.entries.read().await.get(key).cloned()
    }

    /// Overwrite a stored value directly, keeping its lifetime
    pub async fn tamper(&self, key: &str, value: &str) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.value = value.to_string();
        }
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    fn backend_error(operation: &'static str) -> RepositoryError {
        RepositoryError::Backend {
            operation,
            message: "injected failure".to_string(),
        }
    }
}

#[async_trait]
impl CacheRepository for MockCacheRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::backend_error("get"));
        }
        let entries = self.entries.read().await;
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        expiration: Option<Expiration>,
    ) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::backend_error("set"));
        }
        let expiration_seconds = positive_expiration(expiration)?;
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            MockEntry {
                value: value.to_string(),
                expiration_seconds,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::backend_error("delete"));
        }
        self.entries.write().await.remove(key);
        Ok(())
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Memory
    }
}
