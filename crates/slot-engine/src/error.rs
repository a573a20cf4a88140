//! Error types for slot-engine operations.
//!
//! These cover precondition and collaborator failures only. A reservation that
//! breaks a business rule is not an error: it yields a
//! [`Violation`](crate::validator::Violation) inside a
//! [`ValidationReport`](crate::validator::ValidationReport).

use thiserror::Error;

use crate::reservation::ReservationId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    /// The calendar configuration breaks one of its invariants.
    #[error("Invalid calendar: {0}")]
    InvalidCalendar(String),

    /// The caller passed malformed input (e.g. an interval with `end <= start`
    /// where a proper interval is required).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown reservation: {0}")]
    UnknownReservation(ReservationId),

    /// The reservation-lookup collaborator failed to produce a snapshot.
    #[error("Reservation lookup failed: {0}")]
    Lookup(String),
}

pub type Result<T> = std::result::Result<T, SchedulingError>;
