//! Provider-neutral event types.
//!
//! Providers convert their API payloads to and from these types; the
//! orchestrator never sees provider-specific structures.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Minutes before start at which every created event reminds.
pub const REMINDER_MINUTES: i64 = 60;

/// An event to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub subject: String,
    pub start: DateTime<Tz>,
    pub duration_minutes: i64,
    pub reminder_minutes: i64,
}

impl NewEvent {
    pub fn new(start: DateTime<Tz>, subject: impl Into<String>, duration_minutes: i64) -> Self {
        NewEvent {
            subject: subject.into(),
            start,
            duration_minutes,
            reminder_minutes: REMINDER_MINUTES,
        }
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.start + Duration::minutes(self.duration_minutes)
    }

    /// IANA name of the event's timezone, e.g. `Europe/Oslo`.
    pub fn timezone_name(&self) -> &'static str {
        self.start.timezone().name()
    }
}

/// An event as it exists on a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Provider-assigned id
    pub id: String,
    /// Calendar (or folder) the event lives in
    pub calendar_id: String,
    pub subject: String,
    pub start: DateTime<Utc>,
    /// Link to the event in the provider's UI, when it offers one
    pub link: Option<String>,
}

impl CalendarEvent {
    /// Exact subject match, the only key used to correlate events.
    pub fn has_subject(&self, subject: &str) -> bool {
        self.subject == subject
    }
}
