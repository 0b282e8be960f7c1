//! Claim sets: the open, ordered payload carried by a token.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::AuthError;

/// Expiration timestamp claim stamped by the codec
pub const EXPIRY_CLAIM: &str = "exp";

/// Not-before timestamp claim, honoured when present
pub const NOT_BEFORE_CLAIM: &str = "nbf";

/// Ordered mapping of claim name to loosely-typed value
pub type ClaimSet = Map<String, Value>;

/// Convert any serializable value into a claim set
///
/// The value must serialize to a JSON object. Types whose serialization
/// fails (for example maps keyed by non-string values) are rejected with
/// [`AuthError::Encoding`].
pub fn to_claim_set<T: Serialize + ?Sized>(value: &T) -> Result<ClaimSet, AuthError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(claims)) => Ok(claims),
        Ok(other) => Err(AuthError::Encoding {
            message: format!("claims must be a JSON object, got {}", json_type_name(&other)),
        }),
        Err(e) => Err(AuthError::Encoding {
            message: e.to_string(),
        }),
    }
}

/// First claim of `token_claims` that disagrees with `cached`
///
/// Null claims in the token are skipped. A claim absent from `cached`
/// counts as a mismatch.
pub fn first_mismatch<'a>(token_claims: &'a ClaimSet, cached: &ClaimSet) -> Option<&'a str> {
    token_claims
        .iter()
        .filter(|(_, value)| !value.is_null())
        .find(|(name, value)| cached.get(name.as_str()) != Some(*value))
        .map(|(name, _)| name.as_str())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn claims(value: Value) -> ClaimSet {
        match value {
            Value::Object(map) => map,
            _ => panic!("test claims must be an object"),
        }
    }

    #[test]
    fn test_to_claim_set_from_struct() {
        #[derive(Serialize)]
        struct Login {
            user_id: u64,
            username: String,
        }

        let set = to_claim_set(&Login {
            user_id: 1,
            username: "a".into(),
        })
        .unwrap();
        assert_eq!(set.get("user_id"), Some(&json!(1)));
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["user_id", "username"]);
    }

    #[test]
    fn test_to_claim_set_rejects_non_objects() {
        let err = to_claim_set(&vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, AuthError::Encoding { .. }));
    }

    #[test]
    fn test_to_claim_set_rejects_unserializable_keys() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], "value");
        let err = to_claim_set(&map).unwrap_err();
        assert!(matches!(err, AuthError::Encoding { .. }));
    }

    #[test]
    fn test_first_mismatch_none_when_equal() {
        let token = claims(json!({"id": 1, "name": "a"}));
        let cached = claims(json!({"id": 1, "name": "a", "extra": true}));
        assert_eq!(first_mismatch(&token, &cached), None);
    }

    #[test]
    fn test_first_mismatch_reports_first_differing_field() {
        let token = claims(json!({"id": 1, "name": "a", "role": "user"}));
        let cached = claims(json!({"id": 1, "name": "b", "role": "admin"}));
        assert_eq!(first_mismatch(&token, &cached), Some("name"));
    }

    #[test]
    fn test_first_mismatch_missing_field() {
        let token = claims(json!({"id": 1, "scope": "read"}));
        let cached = claims(json!({"id": 1}));
        assert_eq!(first_mismatch(&token, &cached), Some("scope"));
    }

    #[test]
    fn test_first_mismatch_skips_null_claims() {
        let token = claims(json!({"id": 1, "nickname": null}));
        let cached = claims(json!({"id": 1}));
        assert_eq!(first_mismatch(&token, &cached), None);
    }
}
