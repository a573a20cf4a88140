//! Reservation identities and records as seen by the core.
//!
//! The core never creates, edits or deletes reservations on its own; it reads
//! records handed over by a [`ReservationLookup`](crate::lookup::ReservationLookup).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::interval::TimeInterval;

/// Opaque identity of a bookable service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub u64);

/// Opaque identity of a stored reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(pub u64);

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service#{}", self.0)
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reservation#{}", self.0)
    }
}

/// An existing reservation of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub id: ReservationId,
    pub service: ServiceId,
    #[serde(flatten)]
    pub interval: TimeInterval,
}

/// A proposed reservation, not yet stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub service: ServiceId,
    pub interval: TimeInterval,
}

impl Candidate {
    pub fn new(service: ServiceId, interval: TimeInterval) -> Self {
        Self { service, interval }
    }
}
