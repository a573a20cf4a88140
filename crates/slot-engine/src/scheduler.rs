//! The scheduler: one calendar, one reservation lookup, one clock.
//!
//! Operations are split by concern across modules:
//! - [`availability`](crate::availability) — `day_view`, `available_durations`
//! - [`validator`](crate::validator) — `validate`
//! - [`booking`](crate::booking) — `book`, `reschedule`, `cancel`

use chrono::NaiveDateTime;

use crate::calendar::OperatingCalendar;
use crate::clock::{Clock, SystemClock};

pub struct Scheduler<L, C = SystemClock> {
    calendar: OperatingCalendar,
    lookup: L,
    clock: C,
}

impl<L> Scheduler<L, SystemClock> {
    pub fn new(calendar: OperatingCalendar, lookup: L) -> Self {
        Self::with_clock(calendar, lookup, SystemClock)
    }
}

impl<L, C> Scheduler<L, C> {
    pub fn with_clock(calendar: OperatingCalendar, lookup: L, clock: C) -> Self {
        Self {
            calendar,
            lookup,
            clock,
        }
    }

    pub fn calendar(&self) -> &OperatingCalendar {
        &self.calendar
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn into_lookup(self) -> L {
        self.lookup
    }
}

impl<L, C: Clock> Scheduler<L, C> {
    pub(crate) fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }
}
