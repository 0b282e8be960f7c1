//! Default user projection returned by authentication.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::claims::ClaimSet;

/// Authenticated user with an open set of fields
///
/// Built from the token string plus every field of the cached record.
/// Applications wanting a fixed shape can authenticate into their own
/// `Deserialize` type instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The token this user authenticated with
    pub token: String,

    /// Cached claim fields
    #[serde(flatten)]
    pub fields: ClaimSet,
}

impl User {
    /// Raw value of a field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// String value of a field
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Integer value of a field
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }
}
