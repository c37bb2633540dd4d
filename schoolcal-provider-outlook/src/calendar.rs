//! Outlook default calendar behind the calendar port.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono_tz::Tz;
use reqwest::StatusCode;
use schoolcal_core::date_range::DateRange;
use schoolcal_core::error::{SchoolCalError, SchoolCalResult};
use schoolcal_core::event::{CalendarEvent, NewEvent};
use schoolcal_core::port::CalendarPort;
use tracing::{debug, warn};

use crate::app_config::AppConfig;
use crate::auth;
use crate::graph::{EventPage, GraphEvent, NewGraphEvent};

pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

const NAME: &str = "Outlook";

/// Id recorded on listed events; Graph addresses the default calendar
/// without one.
const DEFAULT_CALENDAR: &str = "calendar";

const PAGE_SIZE: u32 = 100;

pub struct OutlookCalendar {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    timezone: Tz,
}

impl OutlookCalendar {
    /// Sign in (cached session, refresh, or browser consent) and build
    /// the adapter. Times are compared in `timezone`.
    pub async fn connect(timezone: Tz) -> Result<Self> {
        let app = AppConfig::load()?;
        let http = reqwest::Client::new();
        let session = auth::load_or_authorize(&app, &http).await?;
        let access_token = session.access_token().to_string();

        Ok(OutlookCalendar {
            http,
            base_url: GRAPH_BASE_URL.to_string(),
            access_token,
            timezone,
        })
    }

    /// Adapter against an arbitrary Graph-compatible endpoint.
    pub fn with_token(base_url: impl Into<String>, access_token: impl Into<String>, timezone: Tz) -> Self {
        OutlookCalendar {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            timezone,
        }
    }

    async fn post_event(&self, event: &NewEvent) -> Result<CalendarEvent> {
        let body = NewGraphEvent::from(event);

        let response = self
            .http
            .post(format!("{}/me/calendar/events", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to create appointment: {}", event.subject))?;

        let response = error_for_status(response).await?;
        let created: GraphEvent = response
            .json()
            .await
            .context("Failed to parse created appointment")?;

        created.into_calendar_event(DEFAULT_CALENDAR, self.timezone)
    }

    /// Every item of the default calendar folder, all pages.
    async fn fetch_all(&self) -> Result<Vec<GraphEvent>> {
        let top = PAGE_SIZE.to_string();
        let first = url::Url::parse_with_params(
            &format!("{}/me/calendar/events", self.base_url),
            &[
                ("$select", "id,subject,start,webLink,isAllDay"),
                ("$top", top.as_str()),
            ],
        )?;

        let mut next = Some(first.to_string());
        let mut events = Vec::new();

        while let Some(url) = next {
            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.access_token)
                .header(
                    "Prefer",
                    format!("outlook.timezone=\"{}\"", self.timezone.name()),
                )
                .send()
                .await
                .context("Failed to fetch appointments")?;

            let page: EventPage = error_for_status(response)
                .await?
                .json()
                .await
                .context("Failed to parse appointments")?;

            debug!(count = page.value.len(), "fetched Outlook page");
            events.extend(page.value);
            next = page.next_link;
        }

        Ok(events)
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        let response = self
            .http
            .delete(format!("{}/me/events/{}", self.base_url, id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .with_context(|| format!("Failed to delete appointment: {}", id))?;

        // Already gone counts as deleted
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }

        error_for_status(response).await?;
        Ok(())
    }
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response.text().await.unwrap_or_default();
    anyhow::bail!("Graph API returned {}: {}", status, error_text)
}

#[async_trait]
impl CalendarPort for OutlookCalendar {
    fn name(&self) -> &str {
        NAME
    }

    async fn create_event(&self, event: &NewEvent) -> SchoolCalResult<CalendarEvent> {
        self.post_event(event)
            .await
            .map_err(|e| SchoolCalError::provider(NAME, e))
    }

    /// Graph is asked for the whole folder; the range is applied here.
    async fn list_events(&self, range: &DateRange) -> SchoolCalResult<Vec<CalendarEvent>> {
        let all = self
            .fetch_all()
            .await
            .map_err(|e| SchoolCalError::provider(NAME, e))?;

        let mut in_range = Vec::new();
        for event in all.into_iter().filter(|e| !e.is_all_day) {
            let id = event.id.clone();
            let event = match event.into_calendar_event(DEFAULT_CALENDAR, self.timezone) {
                Ok(event) => event,
                Err(e) => {
                    warn!(provider = NAME, id = %id, error = %format!("{:#}", e), "skipping unreadable event");
                    continue;
                }
            };
            if range.contains(&event.start) {
                in_range.push(event);
            }
        }

        Ok(in_range)
    }

    async fn remove_event(&self, event: &CalendarEvent) -> SchoolCalResult<()> {
        self.delete_by_id(&event.id)
            .await
            .map_err(|e| SchoolCalError::provider(NAME, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Oslo;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn week_two() -> DateRange {
        DateRange::new(
            Oslo.with_ymd_and_hms(2025, 1, 13, 0, 0, 0).unwrap(),
            Oslo.with_ymd_and_hms(2025, 1, 17, 23, 59, 0).unwrap(),
        )
        .unwrap()
    }

    fn item(id: &str, subject: &str, local: &str) -> serde_json::Value {
        json!({
            "id": id,
            "subject": subject,
            "start": { "dateTime": local, "timeZone": "Europe/Oslo" },
            "isAllDay": false
        })
    }

    #[tokio::test]
    async fn create_posts_reminder_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/me/calendar/events"))
            .and(header("authorization", "Bearer token"))
            .and(body_partial_json(json!({
                "subject": "Drop-off",
                "reminderMinutesBeforeStart": 60,
                "showAs": "oof",
                "categories": ["Private"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(item(
                "new-1",
                "Drop-off",
                "2025-01-20T07:30:00.0000000",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let outlook = OutlookCalendar::with_token(server.uri(), "token", Oslo);
        let start = Oslo.with_ymd_and_hms(2025, 1, 20, 7, 30, 0).unwrap();
        let created = outlook
            .create_event(&NewEvent::new(start, "Drop-off", 60))
            .await
            .unwrap();

        assert_eq!(created.id, "new-1");
        assert_eq!(created.start, start.with_timezone(&chrono::Utc));
    }

    #[tokio::test]
    async fn listing_follows_pages_and_filters_range_client_side() {
        let server = MockServer::start().await;
        let next = format!("{}/me/calendar/events/page2", server.uri());

        Mock::given(method("GET"))
            .and(path("/me/calendar/events"))
            .and(query_param("$top", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    item("a", "Drop-off", "2025-01-13T07:30:00.0000000"),
                    item("b", "Drop-off", "2025-01-20T07:30:00.0000000"),
                ],
                "@odata.nextLink": next,
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/me/calendar/events/page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    item("c", "Pick-up", "2025-01-14T15:30:00.0000000"),
                    {
                        "id": "d",
                        "subject": "Holiday",
                        "start": { "dateTime": "2025-01-15T00:00:00.0000000", "timeZone": "Europe/Oslo" },
                        "isAllDay": true
                    }
                ],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outlook = OutlookCalendar::with_token(server.uri(), "token", Oslo);
        let events = outlook.list_events(&week_two()).await.unwrap();

        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn unreadable_item_is_skipped_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/calendar/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    item("bad", "Drop-off", "13.01.2025 07:30"),
                    item("a", "Drop-off", "2025-01-13T07:30:00.0000000"),
                ],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outlook = OutlookCalendar::with_token(server.uri(), "token", Oslo);
        let events = outlook.list_events(&week_two()).await.unwrap();

        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[tokio::test]
    async fn delete_treats_missing_as_done() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/me/events/gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/me/events/locked"))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
            .expect(1)
            .mount(&server)
            .await;

        let outlook = OutlookCalendar::with_token(server.uri(), "token", Oslo);
        let event = |id: &str| CalendarEvent {
            id: id.to_string(),
            calendar_id: DEFAULT_CALENDAR.to_string(),
            subject: "Drop-off".to_string(),
            start: chrono::Utc.with_ymd_and_hms(2025, 1, 13, 6, 30, 0).unwrap(),
            link: None,
        };

        assert!(outlook.remove_event(&event("gone")).await.is_ok());
        let err = outlook.remove_event(&event("locked")).await.unwrap_err();
        assert!(matches!(err, SchoolCalError::Provider { .. }));
    }

    #[tokio::test]
    async fn server_errors_become_provider_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
            .mount(&server)
            .await;

        let outlook = OutlookCalendar::with_token(server.uri(), "token", Oslo);
        let err = outlook.list_events(&week_two()).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
