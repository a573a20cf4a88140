//! `slots` CLI — query availability and validate reservations from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Slots of a day for service 1, as JSON
//! slots --reservations bookings.json day --service 1 --date 2026-03-16
//!
//! # Durations that can be booked from 09:00
//! slots --reservations bookings.json durations --service 1 --start 2026-03-16T09:00
//!
//! # Check a reservation (exit code 1 when a rule is broken)
//! slots --reservations bookings.json validate --service 1 \
//!     --start 2026-03-16T09:00 --end 2026-03-16T10:00
//!
//! # Validate and append to the reservations file
//! slots --reservations bookings.json book --service 1 \
//!     --start 2026-03-16T09:00 --end 2026-03-16T10:00
//!
//! # Custom opening hours, fixed evaluation time
//! slots --config calendar.toml --now 2026-03-15T12:00 day --service 1 --date 2026-03-16
//! ```

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use slot_engine::{
    BookingError, CalendarConfig, Candidate, Clock, FixedClock, InMemoryReservations,
    OperatingCalendar, ReservationId, ReservationRecord, Scheduler, ServiceId, SystemClock,
    TimeInterval,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Slot availability and reservation validation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Calendar configuration file (TOML); built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Existing reservations (JSON array); none when omitted
    #[arg(long, global = true)]
    reservations: Option<PathBuf>,

    /// Evaluate as of this local time (YYYY-MM-DDTHH:MM) instead of the system clock
    #[arg(long, global = true, value_parser = parse_datetime)]
    now: Option<NaiveDateTime>,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every slot of a day with its availability
    Day {
        #[arg(long)]
        service: u64,
        /// Date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
    },
    /// List the durations that can be booked from a start time
    Durations {
        #[arg(long)]
        service: u64,
        #[arg(long, value_parser = parse_datetime)]
        start: NaiveDateTime,
        /// Reservation being edited (ignored when looking for conflicts)
        #[arg(long)]
        exclude: Option<u64>,
    },
    /// Check a reservation against every rule
    Validate {
        #[arg(long)]
        service: u64,
        #[arg(long, value_parser = parse_datetime)]
        start: NaiveDateTime,
        #[arg(long, value_parser = parse_datetime)]
        end: NaiveDateTime,
        /// Reservation being edited (ignored when looking for conflicts)
        #[arg(long)]
        exclude: Option<u64>,
    },
    /// Validate a reservation and store it in the reservations file
    Book {
        #[arg(long)]
        service: u64,
        #[arg(long, value_parser = parse_datetime)]
        start: NaiveDateTime,
        #[arg(long, value_parser = parse_datetime)]
        end: NaiveDateTime,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let calendar = load_calendar(cli.config.as_deref())?;
    let records = load_reservations(cli.reservations.as_deref())?;
    let store = InMemoryReservations::from_records(records)
        .context("Reservations file contains overlapping or duplicate reservations")?;

    let fixed = cli.now.map(FixedClock);
    let clock: &dyn Clock = match &fixed {
        Some(fixed) => fixed,
        None => &SystemClock,
    };
    debug!(now = %clock.now(), "evaluation time");

    let scheduler = Scheduler::with_clock(calendar, store, clock);

    match cli.command {
        Commands::Day { service, date } => {
            let view = scheduler
                .day_view(ServiceId(service), date)
                .context("Failed to build day view")?;
            print_json(&view)?;
        }
        Commands::Durations {
            service,
            start,
            exclude,
        } => {
            let options = scheduler
                .available_durations_excluding(ServiceId(service), start, exclude.map(ReservationId))
                .context("Failed to compute available durations")?;
            print_json(&options)?;
        }
        Commands::Validate {
            service,
            start,
            end,
            exclude,
        } => {
            let candidate = Candidate::new(ServiceId(service), TimeInterval::new(start, end));
            let report = scheduler
                .validate(&candidate, exclude.map(ReservationId))
                .context("Failed to validate reservation")?;
            if !report.is_acceptable() {
                println!("{}", report);
                process::exit(1);
            }
            println!("OK");
        }
        Commands::Book {
            service,
            start,
            end,
        } => {
            let path = cli
                .reservations
                .as_deref()
                .context("book requires --reservations to store the result")?;
            let candidate = Candidate::new(ServiceId(service), TimeInterval::new(start, end));
            match scheduler.book(&candidate) {
                Ok(record) => {
                    save_reservations(path, &scheduler.lookup().records())?;
                    info!(id = record.id.0, "reservation stored");
                    print_json(&record)?;
                }
                Err(BookingError::Rejected(report)) => {
                    println!("{}", report);
                    process::exit(1);
                }
                Err(err) => return Err(err).context("Failed to book reservation"),
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "slot_engine=debug,slots=debug"
    } else {
        "slot_engine=info,slots=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn load_calendar(path: Option<&Path>) -> Result<OperatingCalendar> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            toml::from_str::<CalendarConfig>(&raw)
                .with_context(|| format!("Failed to parse calendar config: {}", path.display()))?
        }
        None => CalendarConfig::default(),
    };
    OperatingCalendar::try_from(config).context("Invalid calendar configuration")
}

fn load_reservations(path: Option<&Path>) -> Result<Vec<ReservationRecord>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    if !path.exists() {
        debug!(path = %path.display(), "reservations file missing, starting empty");
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse reservations: {}", path.display()))
}

fn save_reservations(path: &Path, records: &[ReservationRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write file: {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Accepts `YYYY-MM-DDTHH:MM` and `YYYY-MM-DDTHH:MM:SS`.
fn parse_datetime(s: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| format!("invalid datetime '{}': {}", s, e))
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{}': {}", s, e))
}
