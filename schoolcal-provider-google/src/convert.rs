//! Conversion between schoolcal events and Google Calendar API events.

use chrono::Utc;
use google_calendar::types::{Event, EventDateTime, EventReminder, Reminders};
use schoolcal_core::event::{CalendarEvent, NewEvent};

pub const VISIBILITY: &str = "private";
pub const TRANSPARENCY: &str = "opaque";

pub trait ToGoogle {
    fn to_google(&self) -> Event;
}

impl ToGoogle for NewEvent {
    fn to_google(&self) -> Event {
        let time_zone = self.timezone_name().to_string();

        Event {
            summary: self.subject.clone(),
            start: Some(EventDateTime {
                date: None,
                date_time: Some(self.start.with_timezone(&Utc)),
                time_zone: time_zone.clone(),
            }),
            end: Some(EventDateTime {
                date: None,
                date_time: Some(self.end().with_timezone(&Utc)),
                time_zone,
            }),
            reminders: Some(Reminders {
                overrides: vec![EventReminder {
                    method: "popup".to_string(),
                    minutes: self.reminder_minutes,
                }],
                use_default: false,
            }),
            visibility: VISIBILITY.to_string(),
            transparency: TRANSPARENCY.to_string(),
            ..Default::default()
        }
    }
}

/// `None` for cancelled instances and all-day events, which reminders
/// never are.
pub fn from_google(event: Event, calendar_id: &str) -> Option<CalendarEvent> {
    if event.status == "cancelled" || event.id.is_empty() {
        return None;
    }

    let start = event.start.as_ref()?.date_time?;

    Some(CalendarEvent {
        id: event.id,
        calendar_id: calendar_id.to_string(),
        subject: event.summary,
        start,
        link: Some(event.html_link).filter(|l| !l.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::Europe::Oslo;

    #[test]
    fn new_event_to_google() {
        let start = Oslo.with_ymd_and_hms(2025, 1, 20, 7, 30, 0).unwrap();
        let event = NewEvent::new(start, "Drop-off", 60).to_google();

        assert_eq!(event.summary, "Drop-off");
        assert!(event.id.is_empty());
        let start = event.start.unwrap();
        assert_eq!(start.date_time, Some(Utc.with_ymd_and_hms(2025, 1, 20, 6, 30, 0).unwrap()));
        assert_eq!(start.time_zone, "Europe/Oslo");
        assert_eq!(
            event.end.unwrap().date_time,
            Some(Utc.with_ymd_and_hms(2025, 1, 20, 7, 30, 0).unwrap())
        );
        let reminders = event.reminders.unwrap();
        assert!(!reminders.use_default);
        assert_eq!(reminders.overrides[0].minutes, 60);
        assert_eq!(event.visibility, "private");
        assert_eq!(event.transparency, "opaque");
    }

    fn google_event(id: &str, status: &str) -> Event {
        Event {
            id: id.to_string(),
            status: status.to_string(),
            summary: "Drop-off".to_string(),
            html_link: "https://www.google.com/calendar/event?eid=abc".to_string(),
            start: Some(EventDateTime {
                date: None,
                date_time: Some(Utc.with_ymd_and_hms(2025, 1, 20, 6, 30, 0).unwrap()),
                time_zone: String::new(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn timed_event_from_google() {
        let event = from_google(google_event("abc", "confirmed"), "primary").unwrap();
        assert_eq!(event.id, "abc");
        assert_eq!(event.calendar_id, "primary");
        assert_eq!(event.subject, "Drop-off");
        assert!(event.link.is_some());
    }

    #[test]
    fn cancelled_and_all_day_are_skipped() {
        assert!(from_google(google_event("abc", "cancelled"), "primary").is_none());

        let mut all_day = google_event("abc", "confirmed");
        all_day.start = Some(EventDateTime {
            date: NaiveDate::from_ymd_opt(2025, 1, 20),
            date_time: None,
            time_zone: String::new(),
        });
        assert!(from_google(all_day, "primary").is_none());
    }
}
