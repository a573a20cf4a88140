//! What can be shown and offered: the day view and the available durations.
//!
//! Availability is display logic, not admission. It does not replay every
//! validation rule (a past day is not rejected, its slots are marked past), but
//! it shares the validator's overlap semantics and open-day policy.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::weekday_name;
use crate::clock::Clock;
use crate::conflict::is_free;
use crate::duration::format_duration;
use crate::error::Result;
use crate::interval::TimeInterval;
use crate::lookup::ReservationLookup;
use crate::reservation::{ReservationId, ServiceId};
use crate::scheduler::Scheduler;
use crate::slots::generate_slots;

/// One bookable unit of a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub available: bool,
    pub is_past: bool,
}

/// A contiguous, conflict-free end time offered for a start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationOption {
    pub end: NaiveDateTime,
    pub minutes: u32,
    /// Display form of `minutes`, see [`format_duration`].
    pub label: String,
}

/// A service's calendar page for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayView {
    pub date: NaiveDate,
    /// Every slot of the day in chronological order.
    pub slots: Vec<Slot>,
    /// Set when the service is closed on `date`.
    pub closed_message: Option<String>,
    pub previous_day: Option<NaiveDate>,
    pub next_day: Option<NaiveDate>,
    pub is_today: bool,
}

impl DayView {
    pub fn available_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| s.available)
    }
}

impl<L: ReservationLookup, C: Clock> Scheduler<L, C> {
    /// Annotate every slot of `date` with past-ness and availability.
    ///
    /// Existing reservations are fetched once for the whole day. A slot is
    /// available when it has not started yet, the day is open, and
    /// `[start, start + slot)` overlaps no reservation of `service`.
    pub fn day_view(&self, service: ServiceId, date: NaiveDate) -> Result<DayView> {
        let calendar = self.calendar();
        let now = self.now();
        let open = calendar.is_open_day(date);

        let midnight = date.and_time(NaiveTime::MIN);
        let next_midnight = date
            .checked_add_days(Days::new(1))
            .map(|d| d.and_time(NaiveTime::MIN))
            .unwrap_or(NaiveDateTime::MAX);
        let day = TimeInterval::new(midnight, next_midnight);
        let existing = self.lookup().reservations_overlapping(service, &day)?;

        let slots: Vec<Slot> = generate_slots(calendar, date)
            .map(|start| {
                let is_past = start < now;
                let unit = TimeInterval::starting_at(start, calendar.slot_minutes());
                let available = !is_past && open && is_free(&existing, service, &unit, None);
                Slot {
                    start,
                    available,
                    is_past,
                }
            })
            .collect();

        debug!(
            %service,
            %date,
            open,
            reservations = existing.len(),
            available = slots.iter().filter(|s| s.available).count(),
            "built day view"
        );

        let closed_message = (!open).then(|| {
            format!(
                "Nos services sont fermés le {}.",
                weekday_name(date.weekday())
            )
        });

        Ok(DayView {
            date,
            slots,
            closed_message,
            previous_day: date.pred_opt(),
            next_day: date.succ_opt(),
            is_today: date == now.date(),
        })
    }

    /// Durations that can be booked from `start`, shortest first.
    ///
    /// Candidate ends advance one slot at a time up to the maximum duration.
    /// The scan stops at the first end past closing or colliding with an
    /// existing reservation, so the result is always a contiguous prefix.
    pub fn available_durations(
        &self,
        service: ServiceId,
        start: NaiveDateTime,
    ) -> Result<Vec<DurationOption>> {
        self.available_durations_excluding(service, start, None)
    }

    /// Same as [`available_durations`](Self::available_durations), ignoring
    /// the reservation `exclude`. Used when offering new lengths for an
    /// existing reservation, which must not block itself.
    pub fn available_durations_excluding(
        &self,
        service: ServiceId,
        start: NaiveDateTime,
        exclude: Option<ReservationId>,
    ) -> Result<Vec<DurationOption>> {
        let calendar = self.calendar();
        let closing = calendar.closing_time(start.date());
        let step = calendar.slot_minutes();
        let max = calendar.max_duration_minutes();

        let horizon = TimeInterval::starting_at(start, max);
        let existing = self.lookup().reservations_overlapping(service, &horizon)?;

        let mut options = Vec::new();
        for minutes in (step..=max).step_by(step as usize) {
            let candidate = TimeInterval::starting_at(start, minutes);
            if candidate.end > closing {
                break;
            }
            if !is_free(&existing, service, &candidate, exclude) {
                break;
            }
            options.push(DurationOption {
                end: candidate.end,
                minutes,
                label: format_duration(minutes),
            });
        }

        debug!(%service, %start, offered = options.len(), "computed available durations");
        Ok(options)
    }
}
