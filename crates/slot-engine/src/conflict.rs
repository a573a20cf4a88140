//! Detect existing reservations that collide with a candidate interval.
//!
//! A conflict is an overlap per [`overlaps`] with a reservation of the same
//! service. Adjacent reservations (one ends exactly when the other starts) are
//! NOT conflicts.

use tracing::trace;

use crate::error::Result;
use crate::interval::{overlaps, TimeInterval};
use crate::lookup::ReservationLookup;
use crate::reservation::{ReservationId, ReservationRecord, ServiceId};

/// Find the reservations of `service` overlapping `candidate`, leaving out the
/// record identified by `exclude` (the reservation being edited).
///
/// An empty result means the interval is free. Overlap is re-checked on the
/// collaborator's answer, so an over-fetching lookup is fine.
pub fn find_conflicts<L: ReservationLookup + ?Sized>(
    lookup: &L,
    service: ServiceId,
    candidate: &TimeInterval,
    exclude: Option<ReservationId>,
) -> Result<Vec<ReservationRecord>> {
    let fetched = lookup.reservations_overlapping(service, candidate)?;
    let conflicts = conflicts_in(&fetched, service, *candidate, exclude)
        .cloned()
        .collect::<Vec<_>>();

    if !conflicts.is_empty() {
        trace!(
            %service,
            start = %candidate.start,
            end = %candidate.end,
            count = conflicts.len(),
            "conflicting reservations found"
        );
    }

    Ok(conflicts)
}

/// Filter an already fetched snapshot down to the records conflicting with
/// `candidate`. Used when one windowed fetch serves many candidate intervals.
pub fn conflicts_in<'a>(
    snapshot: &'a [ReservationRecord],
    service: ServiceId,
    candidate: TimeInterval,
    exclude: Option<ReservationId>,
) -> impl Iterator<Item = &'a ReservationRecord> + 'a {
    snapshot.iter().filter(move |r| {
        r.service == service && Some(r.id) != exclude && overlaps(&r.interval, &candidate)
    })
}

/// `true` when nothing in `snapshot` conflicts with `candidate`.
pub fn is_free(
    snapshot: &[ReservationRecord],
    service: ServiceId,
    candidate: &TimeInterval,
    exclude: Option<ReservationId>,
) -> bool {
    conflicts_in(snapshot, service, *candidate, exclude)
        .next()
        .is_none()
}
