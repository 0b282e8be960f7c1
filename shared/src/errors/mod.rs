//! Shared error types and response structures

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An expiration was given in a representation that has no second count
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid expiration type: expected integer seconds, fractional seconds or a duration, found {found}")]
pub struct InvalidDurationType {
    /// Description of the rejected value
    pub found: String,
}

impl InvalidDurationType {
    pub fn new(found: impl Into<String>) -> Self {
        Self { found: found.into() }
    }
}

/// Configuration loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown storage type: {kind}, available types: {available:?}")]
    UnknownStorageKind {
        kind: String,
        available: Vec<&'static str>,
    },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Body returned to HTTP clients when authentication fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Request path that was rejected
    pub path: String,

    /// Request method
    pub method: String,

    /// Human-readable reason
    pub detail: String,

    /// UNIX timestamp (seconds) of the rejection
    pub timestamp: i64,
}

impl ErrorResponse {
    /// Create a new error response stamped with the current time
    pub fn new(path: impl Into<String>, method: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            detail: detail.into(),
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// Default details used when an error carries no message of its own
pub mod error_details {
    pub const MISSING_HEADER: &str = "Authorization header is missing.";
    pub const UNPARSABLE_HEADER: &str = "Could not parse authorization header.";
    pub const INVALID_SCHEME: &str =
        "Invalid authorization header, expected value in format 'Bearer <token>'.";
    pub const MISSING_CLAIM: &str = "Missing required claim.";
    pub const INVALID_CREDENTIALS: &str = "Could not validate credentials.";
    pub const INTERNAL_ERROR: &str = "Internal Server Error";
}
