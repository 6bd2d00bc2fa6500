use chrono::{DateTime, Utc};

/// Source of wall-clock time for timer actions.
pub trait Clock: Send + Sync {
    /// Current instant, truncated to millisecond precision so that serialized timestamps
    /// match what browser clients produce and parse.
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let now = Utc::now();
        DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
    }
}

#[cfg(test)]
pub use manual::ManualClock;
