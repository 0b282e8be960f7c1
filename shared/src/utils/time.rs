//! Expiration normalization and time sources
//!
//! Expirations arrive in several shapes: whole seconds, fractional seconds,
//! a `chrono::Duration`, or an untyped JSON value read from configuration.
//! [`normalize`] collapses all of them into whole seconds.

use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::errors::InvalidDurationType;

/// An expiration interval in one of its accepted representations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expiration {
    /// Whole seconds
    Seconds(i64),
    /// Fractional seconds, truncated toward zero when normalized
    FractionalSeconds(f64),
    /// A duration, converted to its total whole seconds
    Duration(Duration),
}

impl Expiration {
    /// Whole seconds represented by this expiration
    ///
    /// Fails for non-finite fractional values, which have no second count.
    pub fn as_seconds(&self) -> Result<i64, InvalidDurationType> {
        match *self {
            Expiration::Seconds(seconds) => Ok(seconds),
            Expiration::FractionalSeconds(seconds) if seconds.is_finite() => Ok(seconds.trunc() as i64),
            Expiration::FractionalSeconds(seconds) => Err(InvalidDurationType::new(format!(
                "non-finite number {}",
                seconds
            ))),
            Expiration::Duration(duration) => Ok(duration.num_seconds()),
        }
    }

    /// Interpret an untyped JSON value as an expiration
    ///
    /// `null` means "no expiration". Integers and floats are accepted;
    /// anything else is rejected with [`InvalidDurationType`].
    pub fn from_value(value: &Value) -> Result<Option<Self>, InvalidDurationType> {
        match value {
            Value::Null => Ok(None),
            Value::Number(number) => {
                if let Some(seconds) = number.as_i64() {
                    Ok(Some(Expiration::Seconds(seconds)))
                } else if number.is_u64() {
                    Err(InvalidDurationType::new(format!("out-of-range integer {}", number)))
                } else {
                    number
                        .as_f64()
                        .map(|seconds| Some(Expiration::FractionalSeconds(seconds)))
                        .ok_or_else(|| InvalidDurationType::new(format!("number {}", number)))
                }
            }
            Value::Bool(_) => Err(InvalidDurationType::new("boolean")),
            Value::String(_) => Err(InvalidDurationType::new("string")),
            Value::Array(_) => Err(InvalidDurationType::new("array")),
            Value::Object(_) => Err(InvalidDurationType::new("object")),
        }
    }
}

impl From<i64> for Expiration {
    fn from(seconds: i64) -> Self {
        Expiration::Seconds(seconds)
    }
}

impl From<i32> for Expiration {
    fn from(seconds: i32) -> Self {
        Expiration::Seconds(i64::from(seconds))
    }
}

impl From<f64> for Expiration {
    fn from(seconds: f64) -> Self {
        Expiration::FractionalSeconds(seconds)
    }
}

impl From<Duration> for Expiration {
    fn from(duration: Duration) -> Self {
        Expiration::Duration(duration)
    }
}

impl From<std::time::Duration> for Expiration {
    fn from(duration: std::time::Duration) -> Self {
        Expiration::Seconds(i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
    }
}

impl TryFrom<&Value> for Expiration {
    type Error = InvalidDurationType;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Expiration::from_value(value)?.ok_or_else(|| InvalidDurationType::new("null"))
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiration::Seconds(seconds) => write!(f, "{}s", seconds),
            Expiration::FractionalSeconds(seconds) => write!(f, "{}s", seconds),
            Expiration::Duration(duration) => write!(f, "{}s", duration.num_seconds()),
        }
    }
}

/// Normalize an optional expiration into whole seconds
///
/// Absence is preserved: `None` stays `None`, while zero is returned as
/// `Some(0)` so callers can tell "no expiry" apart from "zero seconds".
pub fn normalize(expiration: Option<Expiration>) -> Result<Option<i64>, InvalidDurationType> {
    expiration.map(|value| value.as_seconds()).transpose()
}

/// Source of the current instant
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current UTC instant
    fn now(&self) -> DateTime<Utc>;

    /// Current UTC instant as a UNIX timestamp in seconds
    fn timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
///
/// Lets expiry behaviour be exercised without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Create a clock frozen at the current wall-clock instant
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }

    /// Jump to an arbitrary instant
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut now = self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
