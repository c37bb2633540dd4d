//! Weekly schedule definition.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveTime};
use chrono_tz::Tz;

use crate::date_range::DateRange;
use crate::error::{SchoolCalError, SchoolCalResult};
use crate::week;

pub const DEFAULT_DURATION_MINUTES: i64 = 60;

/// One group of weeks sharing a subject and a time of day.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    week_numbers: BTreeSet<u32>,
    time_of_day: NaiveTime,
    subject: String,
    duration_minutes: i64,
}

impl ScheduleEntry {
    /// Build an entry, validating week numbers and the `HH:MM` time.
    pub fn new(
        week_numbers: impl IntoIterator<Item = u32>,
        time_of_day: &str,
        subject: impl Into<String>,
    ) -> SchoolCalResult<Self> {
        let week_numbers: BTreeSet<u32> = week_numbers.into_iter().collect();
        let subject = subject.into();

        if week_numbers.is_empty() {
            return Err(SchoolCalError::validation(format!(
                "Schedule entry '{}' has no week numbers",
                subject
            )));
        }

        if let Some(bad) = week_numbers
            .iter()
            .find(|w| !(week::MIN_WEEK..=week::MAX_WEEK).contains(*w))
        {
            return Err(SchoolCalError::validation(format!(
                "Schedule entry '{}' has week {} outside {}-{}",
                subject,
                bad,
                week::MIN_WEEK,
                week::MAX_WEEK
            )));
        }

        if subject.trim().is_empty() {
            return Err(SchoolCalError::validation("Schedule entry has an empty subject"));
        }

        Ok(ScheduleEntry {
            week_numbers,
            time_of_day: week::parse_time_of_day(time_of_day)?,
            subject,
            duration_minutes: DEFAULT_DURATION_MINUTES,
        })
    }

    pub fn with_duration(mut self, minutes: i64) -> SchoolCalResult<Self> {
        if minutes <= 0 {
            return Err(SchoolCalError::validation(format!(
                "Duration must be positive, got {} minutes",
                minutes
            )));
        }
        self.duration_minutes = minutes;
        Ok(self)
    }

    /// Week numbers in ascending order.
    pub fn weeks(&self) -> impl Iterator<Item = u32> + '_ {
        self.week_numbers.iter().copied()
    }

    pub fn earliest_week(&self) -> u32 {
        // Never empty, enforced by `new`
        self.week_numbers.first().copied().unwrap_or(week::MIN_WEEK)
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.time_of_day
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }
}

/// The full set of entries for one run, pinned to a year and timezone.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub year: i32,
    pub timezone: Tz,
    pub entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn new(year: i32, timezone: Tz, entries: Vec<ScheduleEntry>) -> SchoolCalResult<Self> {
        // Surface a bad year before any action runs
        week::monday_of_week(week::MIN_WEEK, year)?;

        Ok(Schedule {
            year,
            timezone,
            entries,
        })
    }

    /// Monday to Friday of `week` at the entry's time of day.
    pub fn dates_for(&self, entry: &ScheduleEntry, week: u32) -> SchoolCalResult<Vec<DateTime<Tz>>> {
        week::resolve_at(week, entry.time_of_day(), self.year, self.timezone)
    }

    /// Monday 00:00 to Friday 23:59 of the entry's earliest week.
    ///
    /// Later weeks of a multi-week entry are not covered.
    pub fn clear_range(&self, entry: &ScheduleEntry) -> SchoolCalResult<DateRange> {
        let week = entry.earliest_week();
        let start_of_day = NaiveTime::MIN;
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 0)
            .ok_or_else(|| SchoolCalError::validation("Invalid end of day"))?;

        let first = week::resolve_at(week, start_of_day, self.year, self.timezone)?;
        let last = week::resolve_at(week, end_of_day, self.year, self.timezone)?;

        match (first.first(), last.last()) {
            (Some(from), Some(to)) => DateRange::new(*from, *to),
            _ => Err(SchoolCalError::validation(format!("Week {} resolved to no dates", week))),
        }
    }
}
