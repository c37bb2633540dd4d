//! Microsoft Graph calendar payloads and their conversion.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use schoolcal_core::event::{CalendarEvent, NewEvent};
use schoolcal_core::week::localize;
use serde::{Deserialize, Serialize};

/// Out of office, the busy status reminders are created with.
pub const SHOW_AS: &str = "oof";
pub const SENSITIVITY: &str = "private";
pub const CATEGORY: &str = "Private";

const GRAPH_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Graph's `dateTimeTimeZone`: a wall-clock time plus a zone name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    pub date_time: String,
    pub time_zone: String,
}

impl DateTimeTimeZone {
    pub fn from_local(dt: &DateTime<Tz>) -> Self {
        DateTimeTimeZone {
            date_time: dt.format(GRAPH_DATETIME_FORMAT).to_string(),
            time_zone: dt.timezone().name().to_string(),
        }
    }

    /// Resolve to an instant. Graph returns naive times; they are read in
    /// the zone the payload names, or in `fallback` when that name is not
    /// an IANA zone (Windows zone names, for instance).
    pub fn to_utc(&self, fallback: Tz) -> Result<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(&self.date_time, "%Y-%m-%dT%H:%M:%S%.f")
            .with_context(|| format!("Invalid Graph dateTime '{}'", self.date_time))?;

        if self.time_zone.eq_ignore_ascii_case("UTC") {
            return Ok(naive.and_utc());
        }

        let tz = self.time_zone.parse::<Tz>().unwrap_or(fallback);
        Ok(localize(tz, naive)?.with_timezone(&Utc))
    }
}

/// Body for `POST /me/calendar/events`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGraphEvent {
    pub subject: String,
    pub start: DateTimeTimeZone,
    pub end: DateTimeTimeZone,
    pub is_reminder_on: bool,
    pub reminder_minutes_before_start: i64,
    pub show_as: String,
    pub sensitivity: String,
    pub categories: Vec<String>,
}

impl From<&NewEvent> for NewGraphEvent {
    fn from(event: &NewEvent) -> Self {
        NewGraphEvent {
            subject: event.subject.clone(),
            start: DateTimeTimeZone::from_local(&event.start),
            end: DateTimeTimeZone::from_local(&event.end()),
            is_reminder_on: true,
            reminder_minutes_before_start: event.reminder_minutes,
            show_as: SHOW_AS.to_string(),
            sensitivity: SENSITIVITY.to_string(),
            categories: vec![CATEGORY.to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEvent {
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub start: DateTimeTimeZone,
    #[serde(default)]
    pub web_link: Option<String>,
    #[serde(default)]
    pub is_all_day: bool,
}

impl GraphEvent {
    pub fn into_calendar_event(self, calendar_id: &str, fallback: Tz) -> Result<CalendarEvent> {
        let start = self.start.to_utc(fallback)?;
        Ok(CalendarEvent {
            id: self.id,
            calendar_id: calendar_id.to_string(),
            subject: self.subject.unwrap_or_default(),
            start,
            link: self.web_link,
        })
    }
}

/// One page of a collection response.
#[derive(Debug, Deserialize)]
pub struct EventPage {
    #[serde(default)]
    pub value: Vec<GraphEvent>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}
