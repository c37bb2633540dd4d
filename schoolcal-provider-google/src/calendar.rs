//! Google Calendar behind the calendar port.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use google_calendar::{Client, ClientError};
use google_calendar::types::{OrderBy, SendUpdates};
use schoolcal_core::date_range::DateRange;
use schoolcal_core::error::{SchoolCalError, SchoolCalResult};
use schoolcal_core::event::{CalendarEvent, NewEvent};
use schoolcal_core::port::CalendarPort;
use tracing::debug;

use crate::app_config::Credentials;
use crate::auth;
use crate::convert::{ToGoogle, from_google};

/// Google's alias for the user's main calendar
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// One target calendar. Calendars of the same account share a client.
pub struct GoogleCalendar {
    client: Arc<Client>,
    calendar_id: String,
    name: String,
}

impl GoogleCalendar {
    /// Sign in once and return one adapter per calendar id.
    pub async fn connect(calendar_ids: &[String]) -> Result<Vec<Self>> {
        let creds = Credentials::load()?;
        let session = auth::load_or_authorize(&creds).await?;
        let client = Arc::new(session.client(&creds));

        Ok(calendar_ids
            .iter()
            .map(|id| GoogleCalendar::with_client(Arc::clone(&client), id))
            .collect())
    }

    pub fn with_client(client: Arc<Client>, calendar_id: &str) -> Self {
        GoogleCalendar {
            client,
            calendar_id: calendar_id.to_string(),
            name: display_name(calendar_id),
        }
    }

    async fn insert(&self, event: &NewEvent) -> Result<CalendarEvent> {
        let google_event = event.to_google();

        let response = self
            .client
            .events()
            .insert(
                &self.calendar_id,
                0,
                0,
                false,
                SendUpdates::None,
                false,
                &google_event,
            )
            .await
            .with_context(|| format!("Failed to create event: {}", event.subject))?;

        from_google(response.body, &self.calendar_id)
            .context("Google returned the created event without a start time")
    }

    async fn list(&self, range: &DateRange) -> Result<Vec<CalendarEvent>> {
        let time_min = range.from_rfc3339();
        let time_max = range.to_rfc3339();

        let response = self
            .client
            .events()
            .list_all(
                &self.calendar_id,
                "",
                0,
                OrderBy::StartTime,
                &[],
                "", // search query
                &[],
                false,
                false,
                true, // expand recurring events into single instances
                &time_max,
                &time_min,
                "",
                "",
            )
            .await
            .context("Failed to fetch events")?;

        let events: Vec<CalendarEvent> = response
            .body
            .into_iter()
            .filter_map(|e| from_google(e, &self.calendar_id))
            .collect();

        debug!(calendar = %self.calendar_id, count = events.len(), "fetched Google events");
        Ok(events)
    }

    async fn delete(&self, event_id: &str) -> Result<()> {
        let result = self
            .client
            .events()
            .delete(&self.calendar_id, event_id, false, SendUpdates::None)
            .await;

        match result {
            Ok(_) => Ok(()),
            // already deleted
            Err(ClientError::HttpError { status, .. }) if status.as_u16() == 410 => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete event: {}", event_id)),
        }
    }
}

fn display_name(calendar_id: &str) -> String {
    if calendar_id == DEFAULT_CALENDAR_ID {
        "Google Calendar".to_string()
    } else {
        format!("Google Calendar ({})", calendar_id)
    }
}

#[async_trait]
impl CalendarPort for GoogleCalendar {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_event(&self, event: &NewEvent) -> SchoolCalResult<CalendarEvent> {
        self.insert(event)
            .await
            .map_err(|e| SchoolCalError::provider(&self.name, e))
    }

    async fn list_events(&self, range: &DateRange) -> SchoolCalResult<Vec<CalendarEvent>> {
        self.list(range)
            .await
            .map_err(|e| SchoolCalError::provider(&self.name, e))
    }

    async fn remove_event(&self, event: &CalendarEvent) -> SchoolCalResult<()> {
        self.delete(&event.id)
            .await
            .map_err(|e| SchoolCalError::provider(&self.name, e))
    }
}
