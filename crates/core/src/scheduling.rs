//! # Availability & Conflict Engine
//!
//! Pure scheduling logic for staff reservations. Given a staff member's
//! working hours, a service duration and a snapshot of already-occupied
//! intervals, this module computes bookable start times and decides whether
//! a proposed reservation may be admitted.
//!
//! All intervals are half-open `[start, end)`: an appointment ending at
//! 10:00 does not conflict with one starting at 10:00, so back-to-back
//! bookings are always possible.
//!
//! The functions here take the occupied snapshot as a plain slice and never
//! touch storage. Serializing concurrent admissions per staff member and
//! day is the caller's responsibility (the API layer holds a per-key lock
//! across fetch-check-insert, and the database carries an exclusion
//! constraint as a backstop).

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{BookingError, BookingResult};

/// Default slot granularity when the deployment does not configure one.
pub const DEFAULT_SLOT_STEP_MINUTES: i64 = 30;

/// A half-open UTC interval `[start, end)` with the invariant `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> BookingResult<Self> {
        if start >= end {
            return Err(BookingError::InvalidRequest(format!(
                "interval start {} must precede end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Builds `[start, start + duration)`.
    pub fn from_start(start: DateTime<Utc>, duration: Duration) -> BookingResult<Self> {
        Self::new(start, start + duration)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Standard half-open overlap test: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// One bookable window within a day, e.g. 09:00-17:00.
///
/// Times serialize as `"HH:MM"`, matching the JSONB shape stored on the
/// staff row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl DayWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> BookingResult<Self> {
        if start >= end {
            return Err(BookingError::InvalidRequest(format!(
                "working-hours window start {} must precede end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Anchors the window to a concrete date as a UTC interval.
    fn on(&self, date: NaiveDate) -> TimeInterval {
        TimeInterval {
            start: date.and_time(self.start).and_utc(),
            end: date.and_time(self.end).and_utc(),
        }
    }
}

pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Raw wire/storage shape: lowercase weekday name to windows.
pub type WorkingHoursMap = HashMap<String, Vec<DayWindow>>;

/// Per-weekday bookable windows for a staff member.
///
/// A weekday with no entry means the staff member is not bookable that day.
/// Windows within a day are kept sorted and must not overlap; adjacent
/// windows (morning/afternoon split) are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WorkingHoursMap", into = "WorkingHoursMap")]
pub struct WorkingHours {
    days: HashMap<Weekday, Vec<DayWindow>>,
}

impl WorkingHours {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds a window to a weekday. Rejects windows overlapping one already
    /// present for that day; touching windows are fine.
    pub fn add_window(&mut self, weekday: Weekday, window: DayWindow) -> BookingResult<()> {
        let windows = self.days.entry(weekday).or_default();
        if windows
            .iter()
            .any(|w| window.start < w.end && w.start < window.end)
        {
            return Err(BookingError::InvalidRequest(format!(
                "overlapping working-hours windows on {}",
                weekday_key(weekday)
            )));
        }
        windows.push(window);
        windows.sort_by_key(|w| w.start);
        Ok(())
    }

    /// Windows for the given weekday, sorted by start; empty when off.
    pub fn windows_for(&self, weekday: Weekday) -> &[DayWindow] {
        self.days.get(&weekday).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(Vec::is_empty)
    }
}

impl TryFrom<WorkingHoursMap> for WorkingHours {
    type Error = BookingError;

    fn try_from(raw: WorkingHoursMap) -> BookingResult<Self> {
        let mut hours = WorkingHours::empty();
        for (key, windows) in raw {
            let weekday = parse_weekday(&key)?;
            for window in windows {
                // Re-run the constructor so JSON loaded from storage is held
                // to the same invariants as programmatic construction.
                let window = DayWindow::new(window.start, window.end)?;
                hours.add_window(weekday, window)?;
            }
        }
        Ok(hours)
    }
}

impl From<WorkingHours> for WorkingHoursMap {
    fn from(hours: WorkingHours) -> Self {
        hours
            .days
            .into_iter()
            .filter(|(_, windows)| !windows.is_empty())
            .map(|(weekday, windows)| (weekday_key(weekday).to_string(), windows))
            .collect()
    }
}

fn parse_weekday(key: &str) -> BookingResult<Weekday> {
    match key.to_ascii_lowercase().as_str() {
        "monday" | "mon" => Ok(Weekday::Mon),
        "tuesday" | "tue" => Ok(Weekday::Tue),
        "wednesday" | "wed" => Ok(Weekday::Wed),
        "thursday" | "thu" => Ok(Weekday::Thu),
        "friday" | "fri" => Ok(Weekday::Fri),
        "saturday" | "sat" => Ok(Weekday::Sat),
        "sunday" | "sun" => Ok(Weekday::Sun),
        other => Err(BookingError::InvalidRequest(format!(
            "unknown weekday key in working hours: {}",
            other
        ))),
    }
}

fn weekday_key(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Computes the ordered bookable start times for one staff member and date.
///
/// Candidate starts are generated per working window at `step` granularity,
/// aligned to the window start. A candidate `t` is returned iff
/// `[t, t + duration)` lies entirely inside the window and overlaps no
/// occupied interval. An empty result is a normal outcome (day off or fully
/// booked), not an error.
pub fn available_slots(
    hours: &WorkingHours,
    date: NaiveDate,
    duration: Duration,
    step: Duration,
    occupied: &[TimeInterval],
) -> Vec<NaiveTime> {
    if duration <= Duration::zero() || step <= Duration::zero() {
        return Vec::new();
    }

    let mut slots = Vec::new();
    for window in hours.windows_for(date.weekday()) {
        let bounds = window.on(date);
        let mut candidate = bounds.start();
        while candidate + duration <= bounds.end() {
            // Constructor cannot fail here: duration is positive.
            let requested = TimeInterval {
                start: candidate,
                end: candidate + duration,
            };
            if !occupied.iter().any(|busy| busy.overlaps(&requested)) {
                slots.push(candidate.time());
            }
            candidate += step;
        }
    }
    slots.sort();
    slots
}

/// Decides whether a proposed reservation may be admitted.
///
/// Checks, in order: the start must lie in the future relative to `now`
/// (`InvalidRequest`), the full interval must fit inside one working-hours
/// window of the start's weekday (`OutOfHours`), and it must not overlap
/// any occupied interval (`SlotUnavailable`). On success returns the
/// admitted interval; persisting it is up to the caller, which must hold
/// the per-staff/day serialization for the whole check-then-insert
/// sequence.
pub fn check_admission(
    hours: &WorkingHours,
    occupied: &[TimeInterval],
    start: DateTime<Utc>,
    duration: Duration,
    now: DateTime<Utc>,
) -> BookingResult<TimeInterval> {
    if start <= now {
        return Err(BookingError::InvalidRequest(
            "cannot book a start time in the past".to_string(),
        ));
    }

    let requested = TimeInterval::from_start(start, duration)?;

    let date = start.date_naive();
    let inside_hours = hours
        .windows_for(date.weekday())
        .iter()
        .any(|window| window.on(date).contains(&requested));
    if !inside_hours {
        return Err(BookingError::OutOfHours(format!(
            "requested interval {} - {} is outside working hours",
            requested.start().time().format("%H:%M"),
            requested.end().time().format("%H:%M"),
        )));
    }

    if let Some(busy) = occupied.iter().find(|busy| busy.overlaps(&requested)) {
        return Err(BookingError::SlotUnavailable(format!(
            "requested interval overlaps an existing reservation starting at {}",
            busy.start().time().format("%H:%M"),
        )));
    }

    Ok(requested)
}
