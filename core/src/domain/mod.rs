//! Domain layer containing the claim set and user projection.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
