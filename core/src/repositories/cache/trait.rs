//! Cache repository trait defining the storage behind token revocation.

use async_trait::async_trait;
use tk_shared::config::StorageKind;
use tk_shared::utils::time::{normalize, Expiration};

use crate::errors::RepositoryError;

/// Key-value storage with optional per-entry expiration
///
/// Keys are token strings and values are serialized claim sets; the
/// repository itself never interprets either. An entry exists only while
/// the token it is keyed by is still accepted by the server.
///
/// Implementations are shared by every in-flight request, so all methods
/// take `&self` and must be safe to call concurrently.
#[async_trait]
pub trait CacheRepository: Send + Sync {
    /// Retrieve the value stored under `key`
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Entry present and not expired
    /// * `Ok(None)` - No entry, or the entry has expired
    /// * `Err(RepositoryError)` - The backend could not be reached
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError>;

    /// Store `value` under `key`, replacing any previous entry
    ///
    /// # Arguments
    /// * `key` - Entry key
    /// * `value` - Serialized value
    /// * `expiration` - Lifetime of the entry; `None` keeps it until deleted.
    ///   Non-positive lifetimes are rejected with
    ///   [`RepositoryError::InvalidExpiration`].
    ///
    /// A `set` without expiration on a key that previously had one clears
    /// the old expiration.
    async fn set(
        &self,
        key: &str,
        value: &str,
        expiration: Option<Expiration>,
    ) -> Result<(), RepositoryError>;

    /// Remove the entry under `key`; removing a missing key is not an error
    async fn delete(&self, key: &str) -> Result<(), RepositoryError>;

    /// Backend kind of this repository
    fn kind(&self) -> StorageKind;

    /// Check whether a live entry exists under `key`
    async fn contains(&self, key: &str) -> Result<bool, RepositoryError> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Normalize an entry expiration to a positive second count
///
/// # Returns
/// * `Ok(None)` - No expiration
/// * `Ok(Some(seconds))` - Lifetime in whole seconds, at least one
/// * `Err(RepositoryError)` - Zero, negative or non-finite lifetime
pub fn positive_expiration(expiration: Option<Expiration>) -> Result<Option<u64>, RepositoryError> {
    match normalize(expiration)? {
        None => Ok(None),
        Some(seconds) if seconds > 0 => Ok(Some(seconds as u64)),
        Some(seconds) => Err(RepositoryError::InvalidExpiration { seconds }),
    }
}
