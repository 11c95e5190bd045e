//! General time utility functions

use chrono::{self, DateTime, Utc};

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration.num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Number of milliseconds elapsed between `earlier` and `later`.
///
/// Negative if `later` is actually before `earlier` (e.g. the wall clock
/// stepped backwards).
pub fn millis_between(earlier: &DateTime<Utc>, later: &DateTime<Utc>) -> i64 {
    later.signed_duration_since(*earlier).num_milliseconds()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_duration_conversions() {
        assert_eq!(
            duration_to_seconds(chrono::Duration::milliseconds(1500)),
            Some(1.5)
        );

        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::milliseconds(70);
        assert_eq!(millis_between(&t0, &t1), 70);
        assert_eq!(millis_between(&t1, &t0), -70);
    }
}
