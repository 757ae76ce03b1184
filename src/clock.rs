//! Clock port
//!
//! The core never reads the system time directly; everything that needs
//! "now" takes a clock so tests can pin it.

use std::sync::Arc;

use chrono::{DateTime, Timelike, Utc};

pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// The production clock
#[derive(Debug, Default, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub type SharedClock = Arc<dyn Clock>;

/// Truncate an instant to midnight UTC.
pub fn midnight_utc(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .with_hour(0)
        .and_then(|dt| dt.with_minute(0))
        .and_then(|dt| dt.with_second(0))
        .and_then(|dt| dt.with_nanosecond(0))
        .expect("midnight is always a valid UTC time")
}

/// A clock pinned to a fixed instant, for tests.
#[derive(Debug, Clone)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_midnight_utc_truncates() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 15, 13, 45, 59).unwrap();
        let midnight = midnight_utc(instant);
        assert_eq!(midnight, Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap());
        assert_eq!(midnight_utc(midnight), midnight);
    }
}
