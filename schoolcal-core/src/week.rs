//! Week number to weekday dates.
//!
//! Weeks are numbered Monday-first, with week 1 starting on the first
//! Monday of the year and any days before it forming week 0 (the `%W`
//! convention). Week 0 is rejected. Week 53 is resolved by plain day
//! arithmetic, so in years with fewer than 53 Mondays its dates run into
//! January of the following year.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use chrono_tz::Tz;

use crate::error::{SchoolCalError, SchoolCalResult};

pub const MIN_WEEK: u32 = 1;
pub const MAX_WEEK: u32 = 53;

/// Monday through Friday.
pub const WORKDAYS_PER_WEEK: i64 = 5;

/// Parse an `HH:MM` 24h time of day.
pub fn parse_time_of_day(s: &str) -> SchoolCalResult<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| {
        SchoolCalError::validation(format!("Invalid time of day '{}'. Expected HH:MM", s))
    })
}

/// Monday of `week` in `year`.
pub fn monday_of_week(week: u32, year: i32) -> SchoolCalResult<NaiveDate> {
    if !(MIN_WEEK..=MAX_WEEK).contains(&week) {
        return Err(SchoolCalError::validation(format!(
            "Week number {} is out of range ({}-{})",
            week, MIN_WEEK, MAX_WEEK
        )));
    }

    if !(1000..=9999).contains(&year) {
        return Err(SchoolCalError::validation(format!(
            "Year {} is not a four-digit calendar year",
            year
        )));
    }

    let first_monday = NaiveDate::from_weekday_of_month_opt(year, 1, Weekday::Mon, 1)
        .ok_or_else(|| SchoolCalError::validation(format!("No first Monday in {}", year)))?;

    Ok(first_monday + Duration::weeks(i64::from(week - 1)))
}

/// Resolve a week number and time of day into the five weekday
/// timestamps (Monday to Friday) of that week in `tz`.
pub fn resolve(week: u32, time_of_day: &str, year: i32, tz: Tz) -> SchoolCalResult<Vec<DateTime<Tz>>> {
    let time = parse_time_of_day(time_of_day)?;
    resolve_at(week, time, year, tz)
}

/// Same as [`resolve`] with an already parsed time.
pub fn resolve_at(week: u32, time: NaiveTime, year: i32, tz: Tz) -> SchoolCalResult<Vec<DateTime<Tz>>> {
    let monday = monday_of_week(week, year)?;

    (0..WORKDAYS_PER_WEEK)
        .map(|offset| localize(tz, (monday + Duration::days(offset)).and_time(time)))
        .collect()
}

/// Attach `tz` to a wall-clock time. Ambiguous times (DST fall-back)
/// take the earlier instant; nonexistent ones (spring-forward gap) fail.
pub fn localize(tz: Tz, naive: NaiveDateTime) -> SchoolCalResult<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(SchoolCalError::validation(format!(
            "{} does not exist in timezone {}",
            naive, tz
        ))),
    }
}
