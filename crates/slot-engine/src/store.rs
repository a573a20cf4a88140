//! In-memory reservation store.
//!
//! Records are kept per service, sorted by start. A write takes the service's
//! shard lock, checks the exclusion constraint and writes before releasing it,
//! so two overlapping bookings of one service can never both land.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::booking::{CommitError, ReservationStore};
use crate::error::Result;
use crate::interval::{overlaps, TimeInterval};
use crate::lookup::ReservationLookup;
use crate::reservation::{ReservationId, ReservationRecord, ServiceId};

#[derive(Debug)]
pub struct InMemoryReservations {
    by_service: DashMap<ServiceId, Vec<ReservationRecord>>,
    services: DashMap<ReservationId, ServiceId>,
    next_id: AtomicU64,
}

impl Default for InMemoryReservations {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryReservations {
    pub fn new() -> Self {
        Self {
            by_service: DashMap::new(),
            services: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Load existing records, keeping their ids. The exclusion constraint
    /// applies: overlapping records are refused.
    pub fn from_records<I>(records: I) -> std::result::Result<Self, CommitError>
    where
        I: IntoIterator<Item = ReservationRecord>,
    {
        let store = Self::new();
        for record in records {
            store.restore(record)?;
        }
        Ok(store)
    }

    /// Insert a record with a caller-chosen id.
    pub fn restore(&self, record: ReservationRecord) -> std::result::Result<(), CommitError> {
        if !record.interval.is_valid() {
            return Err(CommitError::InvalidInterval);
        }
        let mut records = self.by_service.entry(record.service).or_default();
        if self.services.contains_key(&record.id) {
            return Err(CommitError::DuplicateId(record.id));
        }
        let clashes = clashing_ids(&records, &record.interval, None);
        if !clashes.is_empty() {
            return Err(CommitError::Overlap(clashes));
        }

        self.next_id.fetch_max(record.id.0 + 1, Ordering::Relaxed);
        self.services.insert(record.id, record.service);
        insert_sorted(&mut records, record);
        Ok(())
    }

    /// Every record, ordered by service then start.
    pub fn records(&self) -> Vec<ReservationRecord> {
        let mut all: Vec<ReservationRecord> = self
            .by_service
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|r| (r.service, r.interval.start));
        all
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ReservationLookup for InMemoryReservations {
    fn reservations_overlapping(
        &self,
        service: ServiceId,
        window: &TimeInterval,
    ) -> Result<Vec<ReservationRecord>> {
        let Some(records) = self.by_service.get(&service) else {
            return Ok(Vec::new());
        };
        // Everything from `right` on starts at or after the window end.
        let right = records.partition_point(|r| r.interval.start < window.end);
        Ok(records[..right]
            .iter()
            .filter(|r| overlaps(&r.interval, window))
            .cloned()
            .collect())
    }
}

impl ReservationStore for InMemoryReservations {
    fn get(&self, id: ReservationId) -> Option<ReservationRecord> {
        let service = *self.services.get(&id)?;
        let records = self.by_service.get(&service)?;
        let found = records.iter().find(|r| r.id == id).cloned();
        found
    }

    fn insert(
        &self,
        service: ServiceId,
        interval: TimeInterval,
    ) -> std::result::Result<ReservationRecord, CommitError> {
        if !interval.is_valid() {
            return Err(CommitError::InvalidInterval);
        }
        let mut records = self.by_service.entry(service).or_default();
        let clashes = clashing_ids(&records, &interval, None);
        if !clashes.is_empty() {
            return Err(CommitError::Overlap(clashes));
        }

        let id = ReservationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let record = ReservationRecord {
            id,
            service,
            interval,
        };
        self.services.insert(id, service);
        insert_sorted(&mut records, record.clone());
        Ok(record)
    }

    fn reschedule(
        &self,
        id: ReservationId,
        interval: TimeInterval,
    ) -> std::result::Result<ReservationRecord, CommitError> {
        if !interval.is_valid() {
            return Err(CommitError::InvalidInterval);
        }
        let service = self
            .services
            .get(&id)
            .map(|s| *s)
            .ok_or(CommitError::NotFound(id))?;
        let mut records = self
            .by_service
            .get_mut(&service)
            .ok_or(CommitError::NotFound(id))?;

        let clashes = clashing_ids(&records, &interval, Some(id));
        if !clashes.is_empty() {
            return Err(CommitError::Overlap(clashes));
        }
        let pos = records
            .iter()
            .position(|r| r.id == id)
            .ok_or(CommitError::NotFound(id))?;

        let mut record = records.remove(pos);
        record.interval = interval;
        insert_sorted(&mut records, record.clone());
        Ok(record)
    }

    fn cancel(&self, id: ReservationId) -> std::result::Result<ReservationRecord, CommitError> {
        let service = self
            .services
            .get(&id)
            .map(|s| *s)
            .ok_or(CommitError::NotFound(id))?;
        let mut records = self
            .by_service
            .get_mut(&service)
            .ok_or(CommitError::NotFound(id))?;
        let pos = records
            .iter()
            .position(|r| r.id == id)
            .ok_or(CommitError::NotFound(id))?;

        let record = records.remove(pos);
        self.services.remove(&id);
        Ok(record)
    }
}

fn clashing_ids(
    records: &[ReservationRecord],
    interval: &TimeInterval,
    exclude: Option<ReservationId>,
) -> Vec<ReservationId> {
    records
        .iter()
        .filter(|r| Some(r.id) != exclude && overlaps(&r.interval, interval))
        .map(|r| r.id)
        .collect()
}

/// Insert keeping `records` sorted by start.
fn insert_sorted(records: &mut Vec<ReservationRecord>, record: ReservationRecord) {
    let pos = records
        .binary_search_by_key(&record.interval.start, |r| r.interval.start)
        .unwrap_or_else(|e| e);
    records.insert(pos, record);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 16)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn span(sh: u32, sm: u32, eh: u32, em: u32) -> TimeInterval {
        TimeInterval::new(at(sh, sm), at(eh, em))
    }

    #[test]
    fn records_stay_sorted_by_start() {
        let store = InMemoryReservations::new();
        let s = ServiceId(1);
        store.insert(s, span(14, 0, 15, 0)).unwrap();
        store.insert(s, span(9, 0, 10, 0)).unwrap();
        store.insert(s, span(11, 0, 12, 0)).unwrap();

        let starts: Vec<_> = store.records().iter().map(|r| r.interval.start).collect();
        assert_eq!(starts, vec![at(9, 0), at(11, 0), at(14, 0)]);
    }

    #[test]
    fn insert_enforces_exclusion_per_service() {
        let store = InMemoryReservations::new();
        let first = store.insert(ServiceId(1), span(10, 0, 11, 0)).unwrap();

        assert_eq!(
            store.insert(ServiceId(1), span(10, 30, 11, 30)),
            Err(CommitError::Overlap(vec![first.id]))
        );
        // Adjacent is fine, and another service is independent.
        assert!(store.insert(ServiceId(1), span(11, 0, 12, 0)).is_ok());
        assert!(store.insert(ServiceId(2), span(10, 0, 11, 0)).is_ok());
    }

    #[test]
    fn reschedule_ignores_own_interval() {
        let store = InMemoryReservations::new();
        let r = store.insert(ServiceId(1), span(10, 0, 11, 0)).unwrap();
        let moved = store.reschedule(r.id, span(10, 30, 11, 30)).unwrap();
        assert_eq!(moved.interval, span(10, 30, 11, 30));
        assert_eq!(store.get(r.id), Some(moved));
    }

    #[test]
    fn cancel_removes_record() {
        let store = InMemoryReservations::new();
        let r = store.insert(ServiceId(1), span(10, 0, 11, 0)).unwrap();
        assert_eq!(store.len(), 1);
        store.cancel(r.id).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.cancel(r.id), Err(CommitError::NotFound(r.id)));
    }

    #[test]
    fn restore_keeps_ids_and_advances_counter() {
        let store = InMemoryReservations::from_records(vec![ReservationRecord {
            id: ReservationId(41),
            service: ServiceId(1),
            interval: span(9, 0, 10, 0),
        }])
        .unwrap();
        let next = store.insert(ServiceId(1), span(10, 0, 11, 0)).unwrap();
        assert_eq!(next.id, ReservationId(42));
    }

    #[test]
    fn lookup_skips_non_overlapping() {
        let store = InMemoryReservations::new();
        let s = ServiceId(1);
        store.insert(s, span(8, 0, 9, 0)).unwrap();
        let hit = store.insert(s, span(9, 30, 10, 30)).unwrap();
        store.insert(s, span(12, 0, 13, 0)).unwrap();

        let found = store
            .reservations_overlapping(s, &span(10, 0, 12, 0))
            .unwrap();
        assert_eq!(found, vec![hit]);
    }
}
