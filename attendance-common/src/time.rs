//! Timestamp utilities

use chrono::{DateTime, Utc};
use std::time::{Duration, SystemTime};

/// Convert a filesystem timestamp to UTC
pub fn system_time_to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

/// Convert hours to duration
pub fn hours_to_duration(hours: u64) -> Duration {
    Duration::from_secs(hours * 60 * 60)
}

/// Elapsed time between `earlier` and `now`.
///
/// Timestamps in the future (clock skew, touched files) count as zero age.
pub fn age_between(earlier: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(earlier).unwrap_or(Duration::ZERO)
}
