use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::ports::outbound::TimeSource;

/// Default time source using the system clock.
#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Controllable time source for tests.
///
/// Returns the same instant until moved with [`advance`](Self::advance) or
/// [`set`](Self::set).
pub struct FixedTimeSource {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedTimeSource {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.lock() = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut instant = self.instant.lock();
        *instant = *instant + by;
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock()
    }
}
