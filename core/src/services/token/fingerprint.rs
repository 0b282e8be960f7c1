//! Log-safe token identifiers

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest
const FINGERPRINT_LEN: usize = 12;

/// Short, non-reversible identifier for a token
///
/// Tokens are bearer credentials and never appear in logs; this digest
/// prefix lets log lines about the same token be correlated.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(FINGERPRINT_LEN);
    encoded
}
