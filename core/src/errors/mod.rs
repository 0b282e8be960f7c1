//! Error taxonomy for token issuance, validation and storage.

use thiserror::Error;

pub use tk_shared::errors::{ConfigError, InvalidDurationType};

/// Storage-layer faults reported by a [`CacheRepository`](crate::repositories::CacheRepository)
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Cache connection failed: {message}")]
    Connection { message: String },

    #[error("Cache operation '{operation}' failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    #[error("Invalid cache entry expiration: {seconds}s (must be positive)")]
    InvalidExpiration { seconds: i64 },

    #[error("Cached record is not a valid claim set: {message}")]
    CorruptRecord { message: String },

    #[error(transparent)]
    InvalidDurationType(#[from] InvalidDurationType),
}

/// Errors raised by the codec and the lifecycle manager
///
/// The token kinds (see [`AuthError::is_token_error`]) are the ones an HTTP
/// layer turns into distinct client responses; they always reach the caller
/// unchanged.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    InvalidDurationType(#[from] InvalidDurationType),

    #[error("Invalid type in payload: {message}")]
    Encoding { message: String },

    #[error("Token signing failed: {message}")]
    Signature { message: String },

    #[error("Signature has expired")]
    ExpiredToken,

    #[error("Signature verification failed")]
    InvalidSignature,

    #[error("Token is missing the \"{claim}\" claim")]
    MissingClaim { claim: String },

    #[error("Invalid token: {message}")]
    Decode { message: String },

    #[error("Expiration must be a positive number of seconds, got {seconds}")]
    InvalidExpiration { seconds: i64 },

    #[error("Failed to store token in cache ({operation}): {source}")]
    CacheWrite {
        operation: &'static str,
        #[source]
        source: RepositoryError,
    },

    #[error("Failed to retrieve token from cache ({operation}): {source}")]
    CacheRead {
        operation: &'static str,
        #[source]
        source: RepositoryError,
    },

    #[error("Token payload mismatch for key: {field}")]
    TokenPayloadMismatch { field: String },

    #[error("Cached record does not fit the user schema: {message}")]
    UserProjection { message: String },

    #[error("An unexpected error occurred during authentication: {source}")]
    UnexpectedAuth {
        #[source]
        source: Box<AuthError>,
    },
}

impl AuthError {
    /// Whether this is a signature, expiry or claim failure
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            AuthError::ExpiredToken
                | AuthError::InvalidSignature
                | AuthError::MissingClaim { .. }
                | AuthError::Decode { .. }
                | AuthError::TokenPayloadMismatch { .. }
        )
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
