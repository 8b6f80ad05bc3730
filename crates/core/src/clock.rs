//! Wall-clock source for expiry checks

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Expiry is a purely local comparison against this clock; no server round
/// trip is involved.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
