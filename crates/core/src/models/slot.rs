use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::errors::{BookingError, BookingResult};

/// A half-open time range `[start, end)` within a single calendar day.
///
/// The end instant is excluded, so back-to-back bookings (one ending exactly
/// when the next starts) do not conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Interval {
    /// Builds an interval, rejecting empty or reversed ranges.
    pub fn new(start: NaiveTime, end: NaiveTime) -> BookingResult<Self> {
        if start >= end {
            return Err(BookingError::Validation(
                "time_start must be before time_end".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Whether two intervals on the same date share any instant.
    ///
    /// Two half-open intervals `[s1, e1)` and `[s2, e2)` overlap iff
    /// `s1 < e2 && s2 < e1`. Intervals that only touch at an endpoint do not
    /// overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}
