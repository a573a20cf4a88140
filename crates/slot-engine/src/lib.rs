//! # slot-engine
//!
//! Time-slot scheduling and conflict detection for a service-reservation
//! application.
//!
//! Given a service's fixed operating calendar, the engine computes which slots
//! of a day are bookable, which contiguous durations can be offered from a
//! start time, and whether a proposed reservation satisfies the business rules
//! (duration limits, opening hours, open days, slot alignment, and overlap with
//! existing bookings).
//!
//! Every overlap decision in the crate goes through [`interval::overlaps`], so
//! the calendar view and the validator cannot disagree about what a conflict is.
//!
//! ## Modules
//!
//! - [`interval`] — `TimeInterval` and the half-open overlap test
//! - [`calendar`] — `OperatingCalendar` configuration and its predicates
//! - [`slots`] — Slot start-time enumeration for a day
//! - [`reservation`] — Identities, reservation records, booking candidates
//! - [`clock`] — Injected "now" (`SystemClock`, `FixedClock`)
//! - [`lookup`] — The reservation-lookup collaborator trait
//! - [`conflict`] — Conflict detection against existing reservations
//! - [`scheduler`] — `Scheduler`, the entry point tying the pieces together
//! - [`availability`] — Day view and available durations
//! - [`validator`] — Ordered rule validation with `Violation` reporting
//! - [`duration`] — Human-readable duration labels
//! - [`store`] — In-memory reservation store with an exclusion constraint
//! - [`booking`] — Validate-then-commit workflow over a `ReservationStore`
//! - [`error`] — Error types

pub mod availability;
pub mod booking;
pub mod calendar;
pub mod clock;
pub mod conflict;
pub mod duration;
pub mod error;
pub mod interval;
pub mod lookup;
pub mod reservation;
pub mod scheduler;
pub mod slots;
pub mod store;
pub mod validator;

pub use availability::{DayView, DurationOption, Slot};
pub use booking::{BookingError, CommitError, ReservationStore};
pub use calendar::{CalendarConfig, OperatingCalendar};
pub use clock::{Clock, FixedClock, SystemClock};
pub use conflict::find_conflicts;
pub use duration::format_duration;
pub use error::SchedulingError;
pub use interval::{overlaps, TimeInterval};
pub use lookup::ReservationLookup;
pub use reservation::{Candidate, ReservationId, ReservationRecord, ServiceId};
pub use scheduler::Scheduler;
pub use slots::generate_slots;
pub use store::InMemoryReservations;
pub use validator::{ValidationReport, Violation};
