//! Timestamp sources for the `@timestamp` envelope key

use chrono::{SecondsFormat, Utc};

/// Supplies the formatted current time
pub trait Clock: Send + Sync {
    fn now(&self) -> String;
}

/// Wall clock rendering RFC 3339 UTC with millisecond precision
///
/// # Example
///
/// ```
/// use stasher_core::clock::{Clock, SystemClock};
///
/// let ts = SystemClock.now();
/// assert!(ts.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Clock that always returns the same string
#[derive(Debug, Clone)]
pub struct FixedClock(String);

impl FixedClock {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self(timestamp.into())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}
