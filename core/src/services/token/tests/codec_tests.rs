//! Unit tests for the token codec

use std::sync::Arc;

use chrono::Duration;
use serde_json::{json, Value};
use tk_shared::utils::time::{Clock, ManualClock};

use crate::domain::entities::claims::{ClaimSet, EXPIRY_CLAIM};
use crate::errors::AuthError;
use crate::services::token::{DecodeOptions, TokenCodec};

const SECRET: &str = "codec-test-secret";

fn claims(value: Value) -> ClaimSet {
    match value {
        Value::Object(map) => map,
        _ => panic!("test claims must be an object"),
    }
}

fn codec_with_clock() -> (TokenCodec, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let codec = TokenCodec::with_clock(SECRET, "HS256", clock.clone()).unwrap();
    (codec, clock)
}

#[test]
fn test_round_trip_strips_expiry() {
    let (codec, _) = codec_with_clock();
    let original = claims(json!({"user_id": 1, "username": "a", "roles": ["admin"]}));

    let token = codec.encode(&original, Some(3600), None).unwrap();
    let decoded = codec.decode(&token).unwrap();

    assert_eq!(decoded, original);
    assert!(!decoded.contains_key(EXPIRY_CLAIM));
    assert_eq!(
        decoded.keys().collect::<Vec<_>>(),
        vec!["user_id", "username", "roles"]
    );
}

#[test]
fn test_encode_stamps_expiry_from_clock() {
    let (codec, clock) = codec_with_clock();
    let token = codec.encode(&claims(json!({"id": 1})), Some(120), None).unwrap();

    let raw = codec
        .decode_with(&token, &DecodeOptions::default().require(EXPIRY_CLAIM))
        .unwrap();
    assert!(!raw.contains_key(EXPIRY_CLAIM));

    // Still valid one second before the deadline, expired at it
    clock.advance(Duration::seconds(119));
    assert!(codec.decode(&token).is_ok());
    clock.advance(Duration::seconds(1));
    assert!(matches!(codec.decode(&token), Err(AuthError::ExpiredToken)));
}

#[test]
fn test_encode_does_not_modify_caller_claims() {
    let (codec, _) = codec_with_clock();
    let original = claims(json!({"id": 1}));
    let extra = claims(json!({"scope": "read"}));

    let token = codec.encode(&original, Some(60), Some(&extra)).unwrap();

    assert_eq!(original, claims(json!({"id": 1})));
    let decoded = codec.decode(&token).unwrap();
    assert_eq!(decoded.get("scope"), Some(&json!("read")));
}

#[test]
fn test_extra_fields_override_stamped_expiry() {
    let (codec, clock) = codec_with_clock();
    let past = clock.timestamp() - 10;
    let extra = claims(json!({ "exp": past }));

    let token = codec
        .encode(&claims(json!({"id": 1})), Some(3600), Some(&extra))
        .unwrap();

    assert!(matches!(codec.decode(&token), Err(AuthError::ExpiredToken)));
}

#[test]
fn test_no_expiry_never_expires() {
    let (codec, clock) = codec_with_clock();
    let token = codec.encode(&claims(json!({"id": 1})), None, None).unwrap();

    clock.advance(Duration::days(365 * 10));
    let decoded = codec.decode(&token).unwrap();
    assert!(!decoded.contains_key(EXPIRY_CLAIM));
    assert_eq!(decoded.get("id"), Some(&json!(1)));
}

#[test]
fn test_non_positive_expiry_rejected() {
    let (codec, _) = codec_with_clock();
    let set = claims(json!({"id": 1}));

    assert!(matches!(
        codec.encode(&set, Some(0), None),
        Err(AuthError::InvalidExpiration { seconds: 0 })
    ));
    assert!(matches!(
        codec.encode(&set, Some(-30), None),
        Err(AuthError::InvalidExpiration { seconds: -30 })
    ));
}

#[test]
fn test_wrong_secret_is_invalid_signature() {
    let (codec, _) = codec_with_clock();
    let other = TokenCodec::new("another-secret", "HS256").unwrap();
    let token = other.encode(&claims(json!({"id": 1})), Some(60), None).unwrap();

    assert!(matches!(codec.decode(&token), Err(AuthError::InvalidSignature)));
}

#[test]
fn test_signature_check_can_be_disabled() {
    let (codec, _) = codec_with_clock();
    let other = TokenCodec::new("another-secret", "HS256").unwrap();
    let token = other.encode(&claims(json!({"id": 7})), Some(60), None).unwrap();

    let decoded = codec
        .decode_with(&token, &DecodeOptions::default().insecure_without_signature())
        .unwrap();
    assert_eq!(decoded.get("id"), Some(&json!(7)));
}

#[test]
fn test_malformed_token_is_decode_error() {
    let (codec, _) = codec_with_clock();

    assert!(matches!(codec.decode("not-a-token"), Err(AuthError::Decode { .. })));
    assert!(matches!(codec.decode(""), Err(AuthError::Decode { .. })));
}

#[test]
fn test_required_claim_missing() {
    let (codec, _) = codec_with_clock();
    let token = codec.encode(&claims(json!({"id": 1})), Some(60), None).unwrap();

    let options = DecodeOptions::default().require("id").require("sub");
    match codec.decode_with(&token, &options) {
        Err(AuthError::MissingClaim { claim }) => assert_eq!(claim, "sub"),
        other => panic!("expected missing claim, got {:?}", other),
    }
}

#[test]
fn test_not_before_in_future_rejected() {
    let (codec, clock) = codec_with_clock();
    let not_before = clock.timestamp() + 60;
    let token = codec
        .encode(&claims(json!({"id": 1, "nbf": not_before})), Some(3600), None)
        .unwrap();

    assert!(matches!(codec.decode(&token), Err(AuthError::Decode { .. })));
    assert!(codec
        .decode_with(&token, &DecodeOptions::default().without_time_checks())
        .is_ok());

    clock.advance(Duration::seconds(60));
    assert!(codec.decode(&token).is_ok());
}

#[test]
fn test_expired_token_decodes_without_time_checks() {
    let (codec, clock) = codec_with_clock();
    let token = codec.encode(&claims(json!({"id": 1})), Some(5), None).unwrap();
    clock.advance(Duration::seconds(10));

    assert!(matches!(codec.decode(&token), Err(AuthError::ExpiredToken)));
    let decoded = codec
        .decode_with(&token, &DecodeOptions::default().without_time_checks())
        .unwrap();
    assert_eq!(decoded.get("id"), Some(&json!(1)));
}

#[test]
fn test_unknown_algorithm_rejected() {
    assert!(matches!(
        TokenCodec::new(SECRET, "HS999"),
        Err(AuthError::Signature { .. })
    ));
}

#[test]
fn test_asymmetric_algorithm_with_secret_fails_to_sign() {
    let codec = TokenCodec::new(SECRET, "RS256").unwrap();
    assert!(matches!(
        codec.encode(&claims(json!({"id": 1})), Some(60), None),
        Err(AuthError::Signature { .. })
    ));
}

#[test]
fn test_other_hmac_algorithms() {
    for algorithm in ["HS384", "HS512"] {
        let codec = TokenCodec::new(SECRET, algorithm).unwrap();
        let token = codec.encode(&claims(json!({"id": 1})), Some(60), None).unwrap();
        assert_eq!(codec.decode(&token).unwrap().get("id"), Some(&json!(1)));
    }
}
