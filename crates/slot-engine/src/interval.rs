//! Half-open time intervals and the overlap primitive.
//!
//! Two intervals overlap when `a.start < b.end && a.end > b.start`. Touching
//! endpoints (one ends exactly when the other starts) are NOT an overlap.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};

/// A time range `[start, end)` on a single wall clock.
///
/// The constructor does not enforce `end > start`: the validator has to be able
/// to receive inverted candidates and report them as a rule violation. Use
/// [`TimeInterval::try_new`] where a proper interval is a precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Build an interval, rejecting `end <= start` as invalid input.
    pub fn try_new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if end <= start {
            return Err(SchedulingError::InvalidInput(format!(
                "interval end {} is not after start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Interval of `minutes` length starting at `start`.
    pub fn starting_at(start: NaiveDateTime, minutes: u32) -> Self {
        Self {
            start,
            end: start + Duration::minutes(i64::from(minutes)),
        }
    }

    /// `true` when `end > start`.
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Signed length in whole minutes; negative for inverted intervals.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        overlaps(self, other)
    }
}

/// The single overlap test used throughout the crate.
///
/// Any storage-side filter must be expressed as the same predicate
/// (`start < :end AND end > :start`) to stay consistent with this function.
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.start < b.end && a.end > b.start
}
