//! Utility modules

pub mod time;

pub use time::{normalize, Clock, Expiration, ManualClock, SystemClock};
