//! Reservation validation against the business rules.
//!
//! Rules run in a fixed order and never short-circuit, so the user sees every
//! problem at once:
//!
//! 1. end strictly after start
//! 2. duration positive and at most the calendar maximum
//! 3. start strictly in the future
//! 4. within opening hours
//! 5. start on an open day
//! 6. start and end slot-aligned
//! 7. no conflicting reservation (the edited reservation itself excluded)

use std::fmt;

use chrono::{Duration, NaiveDate, Weekday};
use tracing::debug;

use crate::calendar::describe_open_days;
use crate::clock::Clock;
use crate::conflict::find_conflicts;
use crate::duration::format_duration;
use crate::error::Result;
use crate::lookup::ReservationLookup;
use crate::reservation::{Candidate, ReservationId};
use crate::scheduler::Scheduler;

/// A broken business rule. `Display` renders the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    EndNotAfterStart,
    DurationOutOfRange {
        requested_minutes: i64,
        max_minutes: u32,
    },
    InPast,
    OutsideOpeningHours {
        opening_hour: u32,
        closing_hour: u32,
    },
    ClosedDay {
        open_days: Vec<Weekday>,
    },
    Misaligned {
        slot_minutes: u32,
        opening_hour: u32,
    },
    /// The interval overlaps these existing reservations.
    Conflict {
        reservations: Vec<ReservationId>,
    },
    /// Only raised when rescheduling: the reservation has already started.
    AlreadyStarted,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::EndNotAfterStart => {
                write!(f, "La date de fin doit être après la date de début.")
            }
            Violation::DurationOutOfRange {
                requested_minutes,
                max_minutes,
            } => write!(
                f,
                "La durée maximale est de {}. Durée demandée : {} minutes.",
                format_duration(*max_minutes),
                requested_minutes
            ),
            Violation::InPast => write!(f, "Vous ne pouvez pas réserver dans le passé."),
            Violation::OutsideOpeningHours {
                opening_hour,
                closing_hour,
            } => write!(
                f,
                "Les réservations sont possibles de {}h à {}h.",
                opening_hour, closing_hour
            ),
            Violation::ClosedDay { open_days } => write!(
                f,
                "Les réservations sont possibles {} uniquement.",
                describe_open_days(open_days)
            ),
            Violation::Misaligned {
                slot_minutes,
                opening_hour,
            } => {
                let base = NaiveDate::MIN.and_hms_opt(*opening_hour % 24, 0, 0);
                let examples: Vec<String> = (0..3)
                    .filter_map(|i| {
                        base.map(|t| t + Duration::minutes(i64::from(slot_minutes * i)))
                    })
                    .map(|t| t.format("%H:%M").to_string())
                    .collect();
                write!(
                    f,
                    "Les créneaux doivent être alignés sur des tranches de {} minutes (ex: {}...).",
                    slot_minutes,
                    examples.join(", ")
                )
            }
            Violation::Conflict { .. } => write!(
                f,
                "Ce créneau est déjà réservé. Veuillez choisir un autre horaire."
            ),
            Violation::AlreadyStarted => {
                write!(f, "Vous ne pouvez pas modifier une réservation passée.")
            }
        }
    }
}

/// Outcome of a validation: the violated rules, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// No rule was broken; the reservation may be committed.
    pub fn is_acceptable(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    pub fn has_conflict(&self) -> bool {
        self.violations
            .iter()
            .any(|v| matches!(v, Violation::Conflict { .. }))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl IntoIterator for ValidationReport {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<L: ReservationLookup, C: Clock> Scheduler<L, C> {
    /// Run every rule against `candidate`.
    ///
    /// `exclude` names the reservation being edited so its previous interval
    /// does not count as a conflict. `Err` is reserved for lookup failures;
    /// broken rules come back inside the report.
    pub fn validate(
        &self,
        candidate: &Candidate,
        exclude: Option<ReservationId>,
    ) -> Result<ValidationReport> {
        let calendar = self.calendar();
        let interval = candidate.interval;
        let mut violations = Vec::new();

        if !interval.is_valid() {
            violations.push(Violation::EndNotAfterStart);
        }

        let requested_minutes = interval.duration_minutes();
        let max_minutes = calendar.max_duration_minutes();
        if requested_minutes <= 0 || requested_minutes > i64::from(max_minutes) {
            violations.push(Violation::DurationOutOfRange {
                requested_minutes,
                max_minutes,
            });
        }

        if interval.start <= self.now() {
            violations.push(Violation::InPast);
        }

        if !calendar.is_within_hours(&interval) {
            violations.push(Violation::OutsideOpeningHours {
                opening_hour: calendar.opening_hour(),
                closing_hour: calendar.closing_hour(),
            });
        }

        if !calendar.is_open_day(interval.start.date()) {
            violations.push(Violation::ClosedDay {
                open_days: calendar.open_weekdays(),
            });
        }

        if !calendar.is_slot_aligned(interval.start) || !calendar.is_slot_aligned(interval.end) {
            violations.push(Violation::Misaligned {
                slot_minutes: calendar.slot_minutes(),
                opening_hour: calendar.opening_hour(),
            });
        }

        // An inverted interval covers no time and cannot collide with anything.
        if interval.is_valid() {
            let conflicts = find_conflicts(self.lookup(), candidate.service, &interval, exclude)?;
            if !conflicts.is_empty() {
                violations.push(Violation::Conflict {
                    reservations: conflicts.iter().map(|r| r.id).collect(),
                });
            }
        }

        debug!(
            service = %candidate.service,
            start = %interval.start,
            end = %interval.end,
            violations = violations.len(),
            "validated reservation candidate"
        );

        Ok(ValidationReport::new(violations))
    }
}
