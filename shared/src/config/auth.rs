//! Authentication configuration

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::env_opt;
use crate::errors::{ConfigError, InvalidDurationType};
use crate::utils::time::Expiration;

/// Field-name fragments that mark a settings field as the default token lifetime
pub const EXPIRATION_FIELD_CANDIDATES: [&str; 3] = ["expire", "expiration", "exp"];

/// Token signing configuration
///
/// Read-only once handed to the lifecycle manager.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Secret used to sign and verify tokens
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Signing algorithm name (for example `HS256`)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Default token lifetime in seconds; `None` issues non-expiring tokens
    #[serde(default = "default_expiration_seconds")]
    pub expiration_seconds: Option<u64>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            algorithm: default_algorithm(),
            expiration_seconds: default_expiration_seconds(),
        }
    }
}

impl AuthConfig {
    /// Create a configuration with the given secret and default settings
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set the signing algorithm
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Set the default token lifetime
    pub fn with_expiration_seconds(mut self, seconds: Option<u64>) -> Self {
        self.expiration_seconds = seconds;
        self
    }

    /// Default token lifetime in whole minutes
    pub fn expiration_minutes(&self) -> Option<u64> {
        self.expiration_seconds.map(|seconds| seconds / 60)
    }

    /// Check if using the built-in secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == default_secret()
    }

    /// Default lifetime applied when a token is created without one
    ///
    /// Resolved by scanning this configuration's fields, see
    /// [`find_expiration_field`].
    pub fn default_expiration(&self) -> Result<Option<Expiration>, InvalidDurationType> {
        find_expiration_field(self)
    }

    /// Create from environment variables
    ///
    /// `JWT_EXPIRATION_SECONDS` set to `none` disables the default lifetime.
    pub fn from_env() -> Result<Self, ConfigError> {
        let expiration_seconds = parse_expiration_seconds(env_opt("JWT_EXPIRATION_SECONDS"))?;

        Ok(Self {
            secret: env_opt("JWT_SECRET").unwrap_or_else(default_secret),
            algorithm: env_opt("JWT_ALGORITHM").unwrap_or_else(default_algorithm),
            expiration_seconds,
        })
    }
}

/// Find the lifetime field of an arbitrary settings value
///
/// Serializes `settings` and returns the value of the first field, in
/// declaration order, whose name contains one of
/// [`EXPIRATION_FIELD_CANDIDATES`]. A `null` field and a settings value
/// without such a field both resolve to `None`.
pub fn find_expiration_field<T: Serialize>(
    settings: &T,
) -> Result<Option<Expiration>, InvalidDurationType> {
    let value = serde_json::to_value(settings)
        .map_err(|e| InvalidDurationType::new(format!("unserializable settings ({})", e)))?;

    let Value::Object(fields) = value else {
        return Ok(None);
    };

    fields
        .iter()
        .find(|(name, _)| {
            EXPIRATION_FIELD_CANDIDATES
                .iter()
                .any(|candidate| name.contains(candidate))
        })
        .map_or(Ok(None), |(_, value)| Expiration::from_value(value))
}

/// Parse `JWT_EXPIRATION_SECONDS`; unset keeps the default, `none` disables it
fn parse_expiration_seconds(raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default_expiration_seconds());
    };
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    match raw.parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Some(seconds)),
        Ok(_) => Err(ConfigError::InvalidValue {
            key: "JWT_EXPIRATION_SECONDS".to_string(),
            message: "must be a positive number of seconds".to_string(),
        }),
        Err(e) => Err(ConfigError::InvalidValue {
            key: "JWT_EXPIRATION_SECONDS".to_string(),
            message: e.to_string(),
        }),
    }
}

fn default_secret() -> String {
    String::from("default_secret")
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_expiration_seconds() -> Option<u64> {
    Some(3600) // 1 hour
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expiration_seconds() {
        assert_eq!(parse_expiration_seconds(None).unwrap(), Some(3600));
        assert_eq!(parse_expiration_seconds(Some("120".into())).unwrap(), Some(120));
        assert_eq!(parse_expiration_seconds(Some(" None ".into())).unwrap(), None);
    }

    #[test]
    fn test_parse_expiration_seconds_rejects_zero() {
        let err = parse_expiration_seconds(Some("0".into())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "JWT_EXPIRATION_SECONDS"));
        assert!(parse_expiration_seconds(Some("-5".into())).is_err());
        assert!(parse_expiration_seconds(Some("soon".into())).is_err());
    }

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert_eq!(config.secret, "default_secret");
        assert_eq!(config.algorithm, "HS256");
        assert_eq!(config.expiration_seconds, Some(3600));
        assert_eq!(config.expiration_minutes(), Some(60));
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_default_expiration_from_config() {
        let config = AuthConfig::new("s3cret").with_expiration_seconds(Some(120));
        assert_eq!(config.default_expiration().unwrap(), Some(Expiration::Seconds(120)));

        let config = config.with_expiration_seconds(None);
        assert_eq!(config.default_expiration().unwrap(), None);
    }

    #[test]
    fn test_find_expiration_field_on_custom_settings() {
        #[derive(Serialize)]
        struct Settings {
            secret: String,
            jwt_algorithm: String,
            token_expire_after: f64,
            refresh_expiration: u64,
        }

        let settings = Settings {
            secret: "x".into(),
            jwt_algorithm: "HS512".into(),
            token_expire_after: 90.5,
            refresh_expiration: 10,
        };
        assert_eq!(
            find_expiration_field(&settings).unwrap(),
            Some(Expiration::FractionalSeconds(90.5))
        );
    }

    #[test]
    fn test_find_expiration_field_without_match() {
        #[derive(Serialize)]
        struct Settings {
            secret: String,
        }

        let settings = Settings { secret: "x".into() };
        assert_eq!(find_expiration_field(&settings).unwrap(), None);
    }

    #[test]
    fn test_find_expiration_field_rejects_strings() {
        #[derive(Serialize)]
        struct Settings {
            expires: String,
        }

        let settings = Settings { expires: "1h".into() };
        assert!(find_expiration_field(&settings).is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: AuthConfig = serde_json::from_str(r#"{"secret": "abc"}"#).unwrap();
        assert_eq!(config.secret, "abc");
        assert_eq!(config.algorithm, "HS256");
        assert_eq!(config.expiration_seconds, Some(3600));

        let config: AuthConfig =
            serde_json::from_str(r#"{"expiration_seconds": null}"#).unwrap();
        assert_eq!(config.expiration_seconds, None);
    }
}
