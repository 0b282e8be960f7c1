//! Logging configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{env_opt, env_or};
use crate::errors::ConfigError;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    Pretty,
    /// Single-line output
    Compact,
    /// Structured JSON, one object per line
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error), overridden by `RUST_LOG`
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format
    #[serde(default = "default_format")]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl LoggingConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            level: env_opt("LOG_LEVEL").unwrap_or_else(default_level),
            format: env_or("LOG_FORMAT", default_format())?,
        })
    }
}

fn default_level() -> String {
    String::from("info")
}

fn default_format() -> LogFormat {
    LogFormat::Pretty
}
