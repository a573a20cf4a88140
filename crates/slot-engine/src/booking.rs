//! Validate-then-commit workflow.
//!
//! Validation reads a snapshot, so two concurrent bookings of the same slot can
//! both pass it. The store closes that gap: [`ReservationStore`] writes must
//! reject an interval overlapping another reservation of the same service,
//! atomically with the write. A rejection at commit time is reported as the
//! same [`Violation::Conflict`] a pre-commit check produces.

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::SchedulingError;
use crate::interval::TimeInterval;
use crate::lookup::ReservationLookup;
use crate::reservation::{Candidate, ReservationId, ReservationRecord, ServiceId};
use crate::scheduler::Scheduler;
use crate::validator::{ValidationReport, Violation};

/// Failure of a store write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// The exclusion constraint on (service, overlapping interval) fired.
    #[error("interval overlaps existing reservations {0:?}")]
    Overlap(Vec<ReservationId>),

    #[error("unknown reservation: {0}")]
    NotFound(ReservationId),

    #[error("reservation id already in use: {0}")]
    DuplicateId(ReservationId),

    #[error("interval end is not after its start")]
    InvalidInterval,
}

/// Writable reservation storage with an overlap exclusion constraint.
///
/// `insert` and `reschedule` must check for overlap and write in one atomic
/// step (a transaction, an exclusion constraint, or a lock around both).
pub trait ReservationStore: ReservationLookup {
    fn get(&self, id: ReservationId) -> Option<ReservationRecord>;

    fn insert(
        &self,
        service: ServiceId,
        interval: TimeInterval,
    ) -> Result<ReservationRecord, CommitError>;

    fn reschedule(
        &self,
        id: ReservationId,
        interval: TimeInterval,
    ) -> Result<ReservationRecord, CommitError>;

    fn cancel(&self, id: ReservationId) -> Result<ReservationRecord, CommitError>;
}

#[derive(Error, Debug)]
pub enum BookingError {
    /// Business rules rejected the reservation, before or at commit time.
    #[error("{0}")]
    Rejected(ValidationReport),

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}

impl BookingError {
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            BookingError::Rejected(report) => Some(report),
            BookingError::Scheduling(_) => None,
        }
    }
}

impl<S: ReservationStore, C: Clock> Scheduler<S, C> {
    /// Validate `candidate` and store it.
    pub fn book(&self, candidate: &Candidate) -> Result<ReservationRecord, BookingError> {
        let report = self.validate(candidate, None)?;
        if !report.is_acceptable() {
            return Err(BookingError::Rejected(report));
        }

        let record = self
            .lookup()
            .insert(candidate.service, candidate.interval)
            .map_err(commit_rejection)?;
        debug!(id = %record.id, service = %record.service, "reservation booked");
        Ok(record)
    }

    /// Move an existing reservation to `interval`.
    ///
    /// A reservation that has already started cannot be changed. The new
    /// interval is validated with the reservation's own previous interval
    /// excluded from conflict detection.
    pub fn reschedule(
        &self,
        id: ReservationId,
        interval: TimeInterval,
    ) -> Result<ReservationRecord, BookingError> {
        let current = self
            .lookup()
            .get(id)
            .ok_or(SchedulingError::UnknownReservation(id))?;
        if has_started(&current, self.now()) {
            return Err(BookingError::Rejected(ValidationReport::new(vec![
                Violation::AlreadyStarted,
            ])));
        }

        let candidate = Candidate::new(current.service, interval);
        let report = self.validate(&candidate, Some(id))?;
        if !report.is_acceptable() {
            return Err(BookingError::Rejected(report));
        }

        let record = self
            .lookup()
            .reschedule(id, interval)
            .map_err(commit_rejection)?;
        debug!(id = %record.id, service = %record.service, "reservation rescheduled");
        Ok(record)
    }

    /// Remove a reservation.
    pub fn cancel(&self, id: ReservationId) -> Result<ReservationRecord, BookingError> {
        let record = self.lookup().cancel(id).map_err(commit_rejection)?;
        debug!(id = %record.id, service = %record.service, "reservation cancelled");
        Ok(record)
    }
}

fn has_started(record: &ReservationRecord, now: NaiveDateTime) -> bool {
    record.interval.start < now
}

fn commit_rejection(err: CommitError) -> BookingError {
    match err {
        CommitError::Overlap(reservations) => {
            warn!(?reservations, "slot taken between validation and commit");
            BookingError::Rejected(ValidationReport::new(vec![Violation::Conflict {
                reservations,
            }]))
        }
        CommitError::NotFound(id) => SchedulingError::UnknownReservation(id).into(),
        CommitError::InvalidInterval => BookingError::Rejected(ValidationReport::new(vec![
            Violation::EndNotAfterStart,
        ])),
        CommitError::DuplicateId(id) => {
            SchedulingError::InvalidInput(format!("reservation id already in use: {}", id)).into()
        }
    }
}
