//! Operating calendar: opening hours, slot granularity, open weekdays.
//!
//! [`CalendarConfig`] is the plain, deserializable form (what a config file
//! holds). [`OperatingCalendar`] is the validated, immutable value threaded into
//! every other component. Converting one into the other checks the invariants:
//!
//! - `opening_hour < closing_hour <= 24`
//! - `slot_minutes` divides 60 and divides the opening span evenly
//! - `max_duration_minutes` is a positive multiple of `slot_minutes`
//! - open weekdays are non-empty and numbered Monday=1..Sunday=7

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};
use crate::interval::TimeInterval;

/// Raw calendar settings. Missing fields fall back to the defaults of the
/// original service: 08:00–19:00, 30-minute slots, Monday to Saturday, 4 hours max.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub opening_hour: u32,
    pub closing_hour: u32,
    pub slot_minutes: u32,
    /// ISO weekday numbers, Monday=1..Sunday=7.
    pub open_weekdays: Vec<u32>,
    pub max_duration_minutes: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            opening_hour: 8,
            closing_hour: 19,
            slot_minutes: 30,
            open_weekdays: vec![1, 2, 3, 4, 5, 6],
            max_duration_minutes: 240,
        }
    }
}

/// Validated operating calendar. Cheap to clone, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatingCalendar {
    opening_hour: u32,
    closing_hour: u32,
    slot_minutes: u32,
    open_weekdays: BTreeSet<u32>,
    max_duration_minutes: u32,
}

impl TryFrom<CalendarConfig> for OperatingCalendar {
    type Error = SchedulingError;

    fn try_from(config: CalendarConfig) -> Result<Self> {
        let invalid = |msg: String| Err(SchedulingError::InvalidCalendar(msg));

        if config.opening_hour >= config.closing_hour {
            return invalid(format!(
                "opening hour {} must be before closing hour {}",
                config.opening_hour, config.closing_hour
            ));
        }
        if config.closing_hour > 24 {
            return invalid(format!("closing hour {} is past midnight", config.closing_hour));
        }
        if config.slot_minutes == 0 || 60 % config.slot_minutes != 0 {
            return invalid(format!(
                "slot length of {} minutes does not divide an hour",
                config.slot_minutes
            ));
        }
        let open_minutes = (config.closing_hour - config.opening_hour) * 60;
        if open_minutes % config.slot_minutes != 0 {
            return invalid(format!(
                "slot length of {} minutes does not divide the {} opening minutes",
                config.slot_minutes, open_minutes
            ));
        }
        if config.max_duration_minutes == 0 || config.max_duration_minutes % config.slot_minutes != 0
        {
            return invalid(format!(
                "maximum duration of {} minutes is not a positive multiple of {}",
                config.max_duration_minutes, config.slot_minutes
            ));
        }
        if config.open_weekdays.is_empty() {
            return invalid("no open weekday configured".to_string());
        }
        if let Some(day) = config.open_weekdays.iter().find(|d| !(1..=7).contains(*d)) {
            return invalid(format!("weekday {} is outside 1..=7", day));
        }

        Ok(Self {
            opening_hour: config.opening_hour,
            closing_hour: config.closing_hour,
            slot_minutes: config.slot_minutes,
            open_weekdays: config.open_weekdays.into_iter().collect(),
            max_duration_minutes: config.max_duration_minutes,
        })
    }
}

impl Default for OperatingCalendar {
    fn default() -> Self {
        let config = CalendarConfig::default();
        Self {
            opening_hour: config.opening_hour,
            closing_hour: config.closing_hour,
            slot_minutes: config.slot_minutes,
            open_weekdays: config.open_weekdays.into_iter().collect(),
            max_duration_minutes: config.max_duration_minutes,
        }
    }
}

impl OperatingCalendar {
    pub fn opening_hour(&self) -> u32 {
        self.opening_hour
    }

    pub fn closing_hour(&self) -> u32 {
        self.closing_hour
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    pub fn max_duration_minutes(&self) -> u32 {
        self.max_duration_minutes
    }

    pub fn slot_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }

    /// Open weekdays in Monday-first order.
    pub fn open_weekdays(&self) -> Vec<Weekday> {
        self.open_weekdays.iter().filter_map(|&n| weekday_from_number(n)).collect()
    }

    /// `date` at the opening hour.
    pub fn opening_time(&self, date: NaiveDate) -> NaiveDateTime {
        at_hour(date, self.opening_hour)
    }

    /// `date` at the closing hour (may be midnight of the next day when closing at 24).
    pub fn closing_time(&self, date: NaiveDate) -> NaiveDateTime {
        at_hour(date, self.closing_hour)
    }

    pub fn is_open_day(&self, date: NaiveDate) -> bool {
        self.open_weekdays
            .contains(&date.weekday().number_from_monday())
    }

    /// Start at or after opening, end at or before closing, both measured on
    /// the start's calendar day. A start exactly at closing is rejected.
    pub fn is_within_hours(&self, interval: &TimeInterval) -> bool {
        let day = interval.start.date();
        interval.start >= self.opening_time(day)
            && interval.start < self.closing_time(day)
            && interval.end <= self.closing_time(day)
    }

    /// Minute-of-hour is a multiple of the slot length.
    pub fn is_slot_aligned(&self, time: NaiveDateTime) -> bool {
        time.minute() % self.slot_minutes == 0
    }
}

fn at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour))
}

fn weekday_from_number(n: u32) -> Option<Weekday> {
    match n {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

/// French day name, as shown to users of the booking site.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lundi",
        Weekday::Tue => "mardi",
        Weekday::Wed => "mercredi",
        Weekday::Thu => "jeudi",
        Weekday::Fri => "vendredi",
        Weekday::Sat => "samedi",
        Weekday::Sun => "dimanche",
    }
}

/// "du lundi au samedi" for a contiguous run, "les lundi, mercredi" otherwise.
pub(crate) fn describe_open_days(days: &[Weekday]) -> String {
    match days {
        [] => String::new(),
        [only] => format!("le {}", weekday_name(*only)),
        [first, .., last] => {
            let contiguous = days
                .windows(2)
                .all(|w| w[1].number_from_monday() == w[0].number_from_monday() + 1);
            if contiguous {
                format!("du {} au {}", weekday_name(*first), weekday_name(*last))
            } else {
                let names: Vec<&str> = days.iter().map(|d| weekday_name(*d)).collect();
                format!("les {}", names.join(", "))
            }
        }
    }
}
