//! Slot start-time enumeration.
//!
//! Generation only depends on the calendar and the date. Bookings and the
//! current time are applied later by the availability calculator.

use std::iter::FusedIterator;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::calendar::OperatingCalendar;

/// Iterator over the slot starts of one day, from the opening time (inclusive)
/// to the closing time (exclusive), stepping by the slot length.
///
/// A clone yields the remaining starts only; call [`generate_slots`] again for
/// the full day.
#[derive(Debug, Clone)]
pub struct SlotStarts {
    next: NaiveDateTime,
    end: NaiveDateTime,
    step: Duration,
}

impl Iterator for SlotStarts {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next < self.end {
            let current = self.next;
            self.next = current + self.step;
            Some(current)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.next < self.end {
            let span = (self.end - self.next).num_minutes();
            let step = self.step.num_minutes().max(1);
            ((span + step - 1) / step) as usize
        } else {
            0
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SlotStarts {}

impl FusedIterator for SlotStarts {}

/// All slot starts for `date` under `calendar`.
///
/// For a 08:00–19:00 calendar with 30-minute slots this yields 22 starts,
/// 08:00 through 18:30.
pub fn generate_slots(calendar: &OperatingCalendar, date: NaiveDate) -> SlotStarts {
    SlotStarts {
        next: calendar.opening_time(date),
        end: calendar.closing_time(date),
        step: calendar.slot_duration(),
    }
}
