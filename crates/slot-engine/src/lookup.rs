//! The reservation-lookup collaborator.

use crate::error::Result;
use crate::interval::{overlaps, TimeInterval};
use crate::reservation::{ReservationRecord, ServiceId};

/// Read access to existing reservations.
///
/// An implementation must return every reservation of `service` that could
/// overlap `window`. Returning extra records is harmless because callers
/// re-check overlap; leaving one out is a correctness bug. A storage backend
/// should filter with the same predicate as [`overlaps`]:
/// `start < :window_end AND end > :window_start`.
pub trait ReservationLookup {
    fn reservations_overlapping(
        &self,
        service: ServiceId,
        window: &TimeInterval,
    ) -> Result<Vec<ReservationRecord>>;
}

/// A plain snapshot of records.
impl ReservationLookup for [ReservationRecord] {
    fn reservations_overlapping(
        &self,
        service: ServiceId,
        window: &TimeInterval,
    ) -> Result<Vec<ReservationRecord>> {
        Ok(self
            .iter()
            .filter(|r| r.service == service && overlaps(&r.interval, window))
            .cloned()
            .collect())
    }
}

impl ReservationLookup for Vec<ReservationRecord> {
    fn reservations_overlapping(
        &self,
        service: ServiceId,
        window: &TimeInterval,
    ) -> Result<Vec<ReservationRecord>> {
        self.as_slice().reservations_overlapping(service, window)
    }
}

impl<L: ReservationLookup + ?Sized> ReservationLookup for &L {
    fn reservations_overlapping(
        &self,
        service: ServiceId,
        window: &TimeInterval,
    ) -> Result<Vec<ReservationRecord>> {
        (**self).reservations_overlapping(service, window)
    }
}
