//! # Event Timestamps
//!
//! History keys end with a timestamp, so timestamps must sort the same way
//! as strings and as instants. RFC 3339 in UTC with a fixed nine-digit
//! fraction is fixed-width and satisfies both.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Render an instant as a sortable event timestamp.
///
/// Output shape: `YYYY-MM-DDTHH:MM:SS.fffffffffZ`.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Issues strictly increasing instants from a possibly non-monotonic source.
///
/// Not thread-safe on its own; the service keeps it behind its operation lock.
#[derive(Debug, Default, Clone)]
pub struct MonotonicClock {
    last: Option<DateTime<Utc>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `observed` if it is later than the last issued instant,
    /// otherwise issue the last instant plus one nanosecond.
    pub fn issue(&mut self, observed: DateTime<Utc>) -> DateTime<Utc> {
        let next = match self.last {
            Some(last) if observed <= last => last + Duration::nanoseconds(1),
            _ => observed,
        };
        self.last = Some(next);
        next
    }

    /// Last issued instant, if any.
    pub fn last(&self) -> Option<DateTime<Utc>> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_format_is_fixed_width() {
        let a = format_timestamp(at(1_700_000_000));
        let b = format_timestamp(at(1_700_000_000) + Duration::nanoseconds(5));
        assert_eq!(a, "2023-11-14T22:13:20.000000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[test]
    fn test_issue_passes_through_increasing_instants() {
        let mut clock = MonotonicClock::new();
        assert_eq!(clock.issue(at(10)), at(10));
        assert_eq!(clock.issue(at(11)), at(11));
    }

    #[test]
    fn test_issue_bumps_repeated_and_backwards_instants() {
        let mut clock = MonotonicClock::new();
        let first = clock.issue(at(10));
        let second = clock.issue(at(10));
        let third = clock.issue(at(5));

        assert!(second > first);
        assert!(third > second);
        assert_eq!(third - first, Duration::nanoseconds(2));
        assert_eq!(clock.last(), Some(third));
    }
}
