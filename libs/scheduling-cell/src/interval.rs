// libs/scheduling-cell/src/interval.rs
use chrono::{DateTime, Duration, Utc};

use crate::models::SchedulingError;

/// Half-open time interval [start, end) derived from a start instant and a
/// positive duration in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn from_start(
        start: DateTime<Utc>,
        duration_minutes: i32,
    ) -> Result<Self, SchedulingError> {
        if duration_minutes <= 0 {
            return Err(SchedulingError::InvalidDuration(duration_minutes));
        }
        Ok(Self {
            start,
            end: start + Duration::minutes(duration_minutes as i64),
        })
    }

    /// Strict half-open overlap test. Back-to-back intervals sharing a
    /// boundary do not overlap, so adjacent bookings are allowed.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Widen the interval by `minutes` on both sides, for buffer-time checks.
    pub fn expand(&self, minutes: i32) -> TimeInterval {
        let pad = Duration::minutes(minutes as i64);
        TimeInterval {
            start: self.start - pad,
            end: self.end + pad,
        }
    }
}
