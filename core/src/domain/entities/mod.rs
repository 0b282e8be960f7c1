//! Domain entities carried by tokens and cached records.

pub mod claims;
pub mod user;

// Re-export commonly used types
pub use claims::{first_mismatch, to_claim_set, ClaimSet, EXPIRY_CLAIM, NOT_BEFORE_CLAIM};
pub use user::User;
