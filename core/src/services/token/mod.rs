//! Token service module
//!
//! This module handles all token-related operations:
//! - Signing and verification of claim sets
//! - Issuance backed by a cache record
//! - Authentication with claim matching against the cache record
//! - Revocation by deleting the cache record

mod codec;
mod fingerprint;
mod service;

#[cfg(test)]
mod tests;

pub use codec::{DecodeOptions, TokenCodec};
pub use fingerprint::fingerprint;
pub use service::TokenLifecycleManager;
