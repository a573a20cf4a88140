//! Tests for the validate-then-commit workflow and its race handling.

use std::sync::Arc;
use std::thread;

use chrono::{NaiveDate, NaiveDateTime};
use slot_engine::booking::{BookingError, CommitError, ReservationStore};
use slot_engine::error::Result;
use slot_engine::{
    Candidate, FixedClock, InMemoryReservations, OperatingCalendar, ReservationId,
    ReservationLookup, ReservationRecord, Scheduler, SchedulingError, ServiceId, TimeInterval,
    Violation,
};

const SERVICE: ServiceId = ServiceId(7);

fn mon(hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 16)
        .unwrap()
        .and_hms_opt(hour, min, 0)
        .unwrap()
}

fn span(sh: u32, sm: u32, eh: u32, em: u32) -> TimeInterval {
    TimeInterval::new(mon(sh, sm), mon(eh, em))
}

fn scheduler_at<S>(store: S, now: NaiveDateTime) -> Scheduler<S, FixedClock> {
    Scheduler::with_clock(OperatingCalendar::default(), store, FixedClock(now))
}

fn rejection(err: BookingError) -> Vec<Violation> {
    match err {
        BookingError::Rejected(report) => report.violations().to_vec(),
        other => panic!("expected a rejection, got {:?}", other),
    }
}

#[test]
fn book_stores_valid_reservation() {
    let sched = scheduler_at(InMemoryReservations::new(), mon(7, 0));
    let record = sched
        .book(&Candidate::new(SERVICE, span(9, 0, 10, 0)))
        .unwrap();

    assert_eq!(record.service, SERVICE);
    assert_eq!(record.interval, span(9, 0, 10, 0));
    assert_eq!(sched.lookup().get(record.id), Some(record));
}

#[test]
fn book_rejects_conflict_without_writing() {
    let sched = scheduler_at(InMemoryReservations::new(), mon(7, 0));
    let first = sched
        .book(&Candidate::new(SERVICE, span(10, 0, 11, 0)))
        .unwrap();

    let err = sched
        .book(&Candidate::new(SERVICE, span(10, 30, 11, 30)))
        .unwrap_err();
    assert_eq!(
        rejection(err),
        vec![Violation::Conflict {
            reservations: vec![first.id],
        }]
    );
    assert_eq!(sched.lookup().len(), 1);
}

#[test]
fn reschedule_validates_with_self_exclusion() {
    let sched = scheduler_at(InMemoryReservations::new(), mon(7, 0));
    let r = sched
        .book(&Candidate::new(SERVICE, span(10, 0, 11, 0)))
        .unwrap();

    let moved = sched.reschedule(r.id, span(10, 0, 12, 0)).unwrap();
    assert_eq!(moved.id, r.id);
    assert_eq!(moved.interval, span(10, 0, 12, 0));
}

#[test]
fn reschedule_reports_rule_violations() {
    let sched = scheduler_at(InMemoryReservations::new(), mon(7, 0));
    let r = sched
        .book(&Candidate::new(SERVICE, span(10, 0, 11, 0)))
        .unwrap();

    let err = sched.reschedule(r.id, span(10, 0, 15, 0)).unwrap_err();
    assert!(matches!(
        rejection(err).as_slice(),
        [Violation::DurationOutOfRange { requested_minutes: 300, .. }]
    ));
    assert_eq!(sched.lookup().get(r.id).unwrap().interval, span(10, 0, 11, 0));
}

#[test]
fn reschedule_refuses_started_reservation() {
    let store = InMemoryReservations::new();
    let r = store.insert(SERVICE, span(9, 0, 10, 0)).unwrap();
    let sched = scheduler_at(store, mon(9, 30));

    let err = sched.reschedule(r.id, span(15, 0, 16, 0)).unwrap_err();
    assert_eq!(rejection(err), vec![Violation::AlreadyStarted]);
}

#[test]
fn unknown_reservation_is_an_error_not_a_violation() {
    let sched = scheduler_at(InMemoryReservations::new(), mon(7, 0));

    let err = sched
        .reschedule(ReservationId(99), span(9, 0, 10, 0))
        .unwrap_err();
    assert!(matches!(
        err,
        BookingError::Scheduling(SchedulingError::UnknownReservation(ReservationId(99)))
    ));
    assert!(err.report().is_none());

    assert!(matches!(
        sched.cancel(ReservationId(99)),
        Err(BookingError::Scheduling(SchedulingError::UnknownReservation(_)))
    ));
}

#[test]
fn cancel_frees_the_slot() {
    let sched = scheduler_at(InMemoryReservations::new(), mon(7, 0));
    let r = sched
        .book(&Candidate::new(SERVICE, span(10, 0, 11, 0)))
        .unwrap();
    sched.cancel(r.id).unwrap();

    assert!(sched
        .book(&Candidate::new(SERVICE, span(10, 0, 11, 0)))
        .is_ok());
}

/// A store whose reads are stale: it always reports an empty snapshot, as if
/// another request committed right after our validation read.
struct StaleReads(InMemoryReservations);

impl ReservationLookup for StaleReads {
    fn reservations_overlapping(
        &self,
        _service: ServiceId,
        _window: &TimeInterval,
    ) -> Result<Vec<ReservationRecord>> {
        Ok(Vec::new())
    }
}

impl ReservationStore for StaleReads {
    fn get(&self, id: ReservationId) -> Option<ReservationRecord> {
        self.0.get(id)
    }

    fn insert(
        &self,
        service: ServiceId,
        interval: TimeInterval,
    ) -> std::result::Result<ReservationRecord, CommitError> {
        self.0.insert(service, interval)
    }

    fn reschedule(
        &self,
        id: ReservationId,
        interval: TimeInterval,
    ) -> std::result::Result<ReservationRecord, CommitError> {
        self.0.reschedule(id, interval)
    }

    fn cancel(&self, id: ReservationId) -> std::result::Result<ReservationRecord, CommitError> {
        self.0.cancel(id)
    }
}

#[test]
fn commit_time_conflict_surfaces_as_conflict_violation() {
    let inner = InMemoryReservations::new();
    let winner = inner.insert(SERVICE, span(10, 0, 11, 0)).unwrap();
    let sched = scheduler_at(StaleReads(inner), mon(7, 0));

    // Validation sees nothing, the store's constraint catches the overlap.
    let candidate = Candidate::new(SERVICE, span(10, 0, 10, 30));
    assert!(sched.validate(&candidate, None).unwrap().is_acceptable());

    let err = sched.book(&candidate).unwrap_err();
    assert_eq!(
        rejection(err),
        vec![Violation::Conflict {
            reservations: vec![winner.id],
        }]
    );
}

#[test]
fn concurrent_bookings_of_one_slot_admit_exactly_one() {
    let sched = Arc::new(scheduler_at(InMemoryReservations::new(), mon(7, 0)));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let sched = Arc::clone(&sched);
            thread::spawn(move || sched.book(&Candidate::new(SERVICE, span(14, 0, 15, 0))))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let booked = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(booked, 1);
    for err in results.into_iter().filter_map(|r| r.err()) {
        assert!(err.report().is_some_and(|r| r.has_conflict()));
    }
    assert_eq!(sched.lookup().len(), 1);
}
