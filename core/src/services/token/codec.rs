//! Signing and verification of claim sets

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::Value;
use tk_shared::utils::time::{Clock, SystemClock};

use crate::domain::entities::claims::{ClaimSet, EXPIRY_CLAIM, NOT_BEFORE_CLAIM};
use crate::errors::{AuthError, AuthResult};

/// Verification switches for [`TokenCodec::decode_with`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Check the signature against the configured secret
    pub verify_signature: bool,
    /// Reject tokens whose `exp` claim has passed
    pub verify_exp: bool,
    /// Reject tokens whose `nbf` claim is still in the future
    pub verify_nbf: bool,
    /// Claims that must be present in the token
    pub required_claims: Vec<String>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            verify_signature: true,
            verify_exp: true,
            verify_nbf: true,
            required_claims: Vec::new(),
        }
    }
}

impl DecodeOptions {
    /// Skip the `exp` and `nbf` checks, keeping signature verification
    pub fn without_time_checks(mut self) -> Self {
        self.verify_exp = false;
        self.verify_nbf = false;
        self
    }

    /// Skip signature verification
    ///
    /// The returned claims are then unauthenticated; never use this for access decisions.
    pub fn insecure_without_signature(mut self) -> Self {
        self.verify_signature = false;
        self
    }

    /// Require a claim to be present
    pub fn require(mut self, claim: impl Into<String>) -> Self {
        self.required_claims.push(claim.into());
        self
    }
}

/// Signs claim sets into tokens and verifies them back
///
/// Holds only the keys derived from the signing secret; encoding and
/// decoding have no other side effects.
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Creates a codec using the system clock
    ///
    /// # Arguments
    ///
    /// * `secret` - Shared signing secret
    /// * `algorithm` - Algorithm name such as `HS256`
    ///
    /// # Returns
    ///
    /// The codec, or `AuthError::Signature` if the algorithm name is unknown
    pub fn new(secret: &str, algorithm: &str) -> AuthResult<Self> {
        Self::with_clock(secret, algorithm, Arc::new(SystemClock))
    }

    /// Creates a codec reading time from `clock`
    pub fn with_clock(secret: &str, algorithm: &str, clock: Arc<dyn Clock>) -> AuthResult<Self> {
        let algorithm = Algorithm::from_str(algorithm).map_err(|e| AuthError::Signature {
            message: format!("unsupported algorithm '{}': {}", algorithm, e),
        })?;

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            clock,
        })
    }

    /// Signing algorithm
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Signs a claim set
    ///
    /// The caller's claims are copied, never modified. When
    /// `expiration_seconds` is given an `exp` claim of "now + seconds" is
    /// stamped; `extra` fields are merged last and win over both.
    ///
    /// # Arguments
    ///
    /// * `claims` - Claim set to sign
    /// * `expiration_seconds` - Token lifetime; must be positive when given
    /// * `extra` - Additional claims merged into the token only
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The signed token
    /// * `Err(AuthError::InvalidExpiration)` - Lifetime is zero or negative
    /// * `Err(AuthError::Encoding)` - Claims could not be serialized
    /// * `Err(AuthError::Signature)` - Key or algorithm rejected by the signer
    pub fn encode(
        &self,
        claims: &ClaimSet,
        expiration_seconds: Option<i64>,
        extra: Option<&ClaimSet>,
    ) -> AuthResult<String> {
        let mut payload = claims.clone();

        if let Some(seconds) = expiration_seconds {
            let expires_at = match self.clock.timestamp().checked_add(seconds) {
                Some(expires_at) if seconds > 0 => expires_at,
                _ => return Err(AuthError::InvalidExpiration { seconds }),
            };
            payload.insert(EXPIRY_CLAIM.to_string(), Value::from(expires_at));
        }

        if let Some(extra) = extra {
            for (name, value) in extra {
                payload.insert(name.clone(), value.clone());
            }
        }

        encode(&Header::new(self.algorithm), &payload, &self.encoding_key).map_err(|e| match e.kind() {
            ErrorKind::Json(_) => AuthError::Encoding {
                message: e.to_string(),
            },
            _ => AuthError::Signature {
                message: e.to_string(),
            },
        })
    }

    /// Verifies a token with the default options and returns its claims
    ///
    /// The `exp` claim is stripped from the result.
    pub fn decode(&self, token: &str) -> AuthResult<ClaimSet> {
        self.decode_with(token, &DecodeOptions::default())
    }

    /// Verifies a token and returns its claims without `exp`
    ///
    /// # Returns
    ///
    /// * `Ok(ClaimSet)` - Verified claims
    /// * `Err(AuthError::ExpiredToken)` - The `exp` claim has passed
    /// * `Err(AuthError::InvalidSignature)` - Signature does not match
    /// * `Err(AuthError::MissingClaim)` - A required claim is absent
    /// * `Err(AuthError::Decode)` - Malformed token or any other failure
    pub fn decode_with(&self, token: &str, options: &DecodeOptions) -> AuthResult<ClaimSet> {
        let mut validation = Validation::new(self.algorithm);
        // Time claims are checked below against the injected clock
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        if !options.verify_signature {
            validation.insecure_disable_signature_validation();
        }

        let claims = decode::<ClaimSet>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim {
                    claim: claim.clone(),
                },
                _ => AuthError::Decode {
                    message: e.to_string(),
                },
            })?
            .claims;

        if let Some(claim) = options
            .required_claims
            .iter()
            .find(|claim| !claims.contains_key(claim.as_str()))
        {
            return Err(AuthError::MissingClaim {
                claim: claim.clone(),
            });
        }

        let now = self.clock.timestamp();
        if options.verify_exp {
            if let Some(expires_at) = timestamp_claim(&claims, EXPIRY_CLAIM)? {
                if now >= expires_at {
                    return Err(AuthError::ExpiredToken);
                }
            }
        }
        if options.verify_nbf {
            if let Some(not_before) = timestamp_claim(&claims, NOT_BEFORE_CLAIM)? {
                if now < not_before {
                    return Err(AuthError::Decode {
                        message: "The token is not yet valid (nbf)".to_string(),
                    });
                }
            }
        }

        Ok(claims
            .into_iter()
            .filter(|(name, _)| name != EXPIRY_CLAIM)
            .collect())
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Read a numeric timestamp claim, rejecting non-numeric values
fn timestamp_claim(claims: &ClaimSet, name: &str) -> AuthResult<Option<i64>> {
    match claims.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_i64()
            .or_else(|| value.as_f64().map(|timestamp| timestamp as i64))
            .map(Some)
            .ok_or_else(|| AuthError::Decode {
                message: format!("The \"{}\" claim must be a number", name),
            }),
    }
}
