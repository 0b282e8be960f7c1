//! Token lifecycle manager implementation

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tk_shared::config::AuthConfig;
use tk_shared::utils::time::{normalize, Clock, Expiration, SystemClock};
use tracing::{debug, info, warn};

use crate::domain::entities::claims::{first_mismatch, to_claim_set, ClaimSet};
use crate::domain::entities::user::User;
use crate::errors::{AuthError, AuthResult, RepositoryError};
use crate::repositories::CacheRepository;

use super::codec::{DecodeOptions, TokenCodec};
use super::fingerprint::fingerprint;

/// Field of the user record that carries the token itself
const TOKEN_FIELD: &str = "token";

/// Issues, validates and revokes tokens backed by a cache record
///
/// A token is accepted only while its signature and expiry are valid AND a
/// cache record keyed by the token exists whose fields agree with the
/// token's claims. Deleting the record revokes the token.
///
/// The manager is built once at startup and shared by reference (for
/// example in an `Arc` or `web::Data`). `U` is the shape authenticated users
/// are returned in; it defaults to the open [`User`].
pub struct TokenLifecycleManager<U = User> {
    config: AuthConfig,
    codec: TokenCodec,
    repository: Arc<dyn CacheRepository>,
    _user: PhantomData<fn() -> U>,
}

impl<U: DeserializeOwned> TokenLifecycleManager<U> {
    /// Creates a new manager using the system clock
    ///
    /// # Arguments
    ///
    /// * `config` - Signing secret, algorithm and default lifetime
    /// * `repository` - Cache holding one record per live token
    ///
    /// # Returns
    ///
    /// The manager, or `AuthError::Signature` if the algorithm is unknown
    pub fn new(config: AuthConfig, repository: Arc<dyn CacheRepository>) -> AuthResult<Self> {
        Self::with_clock(config, repository, Arc::new(SystemClock))
    }

    /// Creates a new manager whose codec reads time from `clock`
    pub fn with_clock(
        config: AuthConfig,
        repository: Arc<dyn CacheRepository>,
        clock: Arc<dyn Clock>,
    ) -> AuthResult<Self> {
        if config.is_using_default_secret() {
            warn!("Token manager is using the built-in default secret; set JWT_SECRET in production");
        }

        let codec = TokenCodec::with_clock(&config.secret, &config.algorithm, clock)?;

        info!(
            algorithm = %config.algorithm,
            storage = %repository.kind(),
            default_expiration_seconds = ?config.expiration_seconds,
            "Token lifecycle manager initialized"
        );

        Ok(Self {
            config,
            codec,
            repository,
            _user: PhantomData,
        })
    }

    /// Authentication configuration
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Cache repository backing revocation
    pub fn repository(&self) -> &Arc<dyn CacheRepository> {
        &self.repository
    }

    /// Codec used to sign and verify tokens
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Issues a token for `claims` and records it in the cache
    ///
    /// An explicit `expiration` wins; otherwise the configured default
    /// lifetime applies, and without one the token never expires. The cache
    /// record is written with the same lifetime as the token.
    ///
    /// # Arguments
    ///
    /// * `claims` - Any value serializing to a JSON object
    /// * `expiration` - Token lifetime overriding the configured default
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The signed token
    /// * `Err(AuthError::InvalidExpiration)` - Lifetime is zero or negative
    /// * `Err(AuthError::InvalidDurationType)` - Lifetime is not a number of seconds
    /// * `Err(AuthError::Encoding)` - Claims are not a JSON object
    /// * `Err(AuthError::CacheWrite)` - The cache record could not be written
    pub async fn create_token<C>(&self, claims: &C, expiration: Option<Expiration>) -> AuthResult<String>
    where
        C: Serialize + ?Sized,
    {
        let expiration = match expiration {
            Some(expiration) => Some(expiration),
            None => self.config.default_expiration()?,
        };

        let expiration_seconds = normalize(expiration)?;
        if let Some(seconds) = expiration_seconds {
            if seconds <= 0 {
                return Err(AuthError::InvalidExpiration { seconds });
            }
        }

        let claims = to_claim_set(claims)?;
        let token = self.codec.encode(&claims, expiration_seconds, None)?;
        let record = serde_json::to_string(&claims).map_err(|e| AuthError::Encoding {
            message: e.to_string(),
        })?;

        self.repository
            .set(&token, &record, expiration_seconds.map(Expiration::Seconds))
            .await
            .map_err(|source| AuthError::CacheWrite {
                operation: "create_token",
                source,
            })?;

        debug!(
            token = %fingerprint(&token),
            expiration_seconds = ?expiration_seconds,
            "Token issued"
        );

        Ok(token)
    }

    /// Resolves a token to its user
    ///
    /// Token failures (expired, bad signature, missing claim, malformed,
    /// payload mismatch) are returned unchanged; any other failure is
    /// wrapped in [`AuthError::UnexpectedAuth`].
    ///
    /// # Returns
    ///
    /// * `Ok(Some(user))` - Token is valid and its record matches
    /// * `Ok(None)` - Token was revoked or never issued by this server
    pub async fn authenticate(&self, token: &str) -> AuthResult<Option<U>> {
        match self.get_current_user(token).await {
            Ok(user) => Ok(user),
            Err(e) if e.is_token_error() => {
                debug!(token = %fingerprint(token), error = %e, "Token rejected");
                Err(e)
            }
            Err(e) => {
                warn!(token = %fingerprint(token), error = %e, "Authentication failed unexpectedly");
                Err(AuthError::UnexpectedAuth { source: Box::new(e) })
            }
        }
    }

    /// Verifies a token and loads its user from the cache record
    ///
    /// # Returns
    ///
    /// * `Ok(Some(user))` - The token string merged with the cached fields
    /// * `Ok(None)` - No cache record exists for the token
    /// * `Err(AuthError::TokenPayloadMismatch)` - A non-null claim differs from the record
    /// * `Err(AuthError::CacheRead)` - The record could not be read or parsed
    /// * `Err(AuthError::UserProjection)` - The record does not fit `U`
    pub async fn get_current_user(&self, token: &str) -> AuthResult<Option<U>> {
        let claims = self.codec.decode(token)?;

        let record = self
            .repository
            .get(token)
            .await
            .map_err(|source| AuthError::CacheRead {
                operation: "get_current_user",
                source,
            })?;

        let Some(record) = record else {
            debug!(token = %fingerprint(token), "No cache record for token");
            return Ok(None);
        };

        let cached: ClaimSet = serde_json::from_str(&record).map_err(|e| AuthError::CacheRead {
            operation: "get_current_user",
            source: RepositoryError::CorruptRecord {
                message: e.to_string(),
            },
        })?;

        if let Some(field) = first_mismatch(&claims, &cached) {
            warn!(token = %fingerprint(token), field, "Token claims disagree with cache record");
            return Err(AuthError::TokenPayloadMismatch {
                field: field.to_string(),
            });
        }

        let mut user = ClaimSet::new();
        user.insert(TOKEN_FIELD.to_string(), Value::String(token.to_string()));
        user.extend(cached);

        serde_json::from_value(Value::Object(user))
            .map(Some)
            .map_err(|e| AuthError::UserProjection {
                message: e.to_string(),
            })
    }

    /// Revokes a token by deleting its cache record
    ///
    /// The signature must verify, but an expired token is still accepted so
    /// that revoking it succeeds as a no-op.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Record deleted, or there was none
    /// * `Err(AuthError::InvalidSignature)` / `Err(AuthError::Decode)` - Not a token of this server
    /// * `Err(AuthError::CacheWrite)` - The record could not be deleted
    pub async fn invalidate_token(&self, token: &str) -> AuthResult<()> {
        self.codec
            .decode_with(token, &DecodeOptions::default().without_time_checks())?;

        self.repository
            .delete(token)
            .await
            .map_err(|source| AuthError::CacheWrite {
                operation: "invalidate_token",
                source,
            })?;

        info!(token = %fingerprint(token), "Token invalidated");
        Ok(())
    }
}

impl<U> fmt::Debug for TokenLifecycleManager<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenLifecycleManager")
            .field("algorithm", &self.config.algorithm)
            .field("expiration_seconds", &self.config.expiration_seconds)
            .field("storage", &self.repository.kind())
            .finish_non_exhaustive()
    }
}
