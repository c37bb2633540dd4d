//! In-memory calendar port for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::date_range::DateRange;
use crate::error::{SchoolCalError, SchoolCalResult};
use crate::event::{CalendarEvent, NewEvent};
use crate::port::CalendarPort;

#[derive(Default)]
struct State {
    events: Vec<CalendarEvent>,
    created: Vec<NewEvent>,
    removed: Vec<String>,
    next_id: usize,
    fail_listing: bool,
    fail_create: bool,
    fail_removal: Vec<String>,
}

/// Records every call; event ids are `fake-1`, `fake-2`, ...
pub struct FakeCalendar {
    name: String,
    state: Mutex<State>,
}

impl FakeCalendar {
    pub fn new(name: &str) -> Self {
        FakeCalendar {
            name: name.to_string(),
            state: Mutex::default(),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn seed(&self, subject: &str, start: DateTime<Utc>) -> String {
        let mut state = self.state();
        state.next_id += 1;
        let id = format!("fake-{}", state.next_id);
        state.events.push(CalendarEvent {
            id: id.clone(),
            calendar_id: "fake".to_string(),
            subject: subject.to_string(),
            start,
            link: None,
        });
        id
    }

    pub fn fail_listing(&self) {
        self.state().fail_listing = true;
    }

    pub fn fail_create(&self) {
        self.state().fail_create = true;
    }

    pub fn fail_removal_of(&self, id: &str) {
        self.state().fail_removal.push(id.to_string());
    }

    pub fn created(&self) -> Vec<NewEvent> {
        self.state().created.clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.state().removed.clone()
    }

    pub fn remaining(&self) -> usize {
        self.state().events.len()
    }
}

#[async_trait]
impl CalendarPort for FakeCalendar {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_event(&self, event: &NewEvent) -> SchoolCalResult<CalendarEvent> {
        if self.state().fail_create {
            return Err(SchoolCalError::provider(&self.name, "create rejected"));
        }
        let id = self.seed(&event.subject, event.start.with_timezone(&Utc));
        self.state().created.push(event.clone());
        Ok(CalendarEvent {
            id,
            calendar_id: "fake".to_string(),
            subject: event.subject.clone(),
            start: event.start.with_timezone(&Utc),
            link: None,
        })
    }

    async fn list_events(&self, range: &DateRange) -> SchoolCalResult<Vec<CalendarEvent>> {
        let state = self.state();
        if state.fail_listing {
            return Err(SchoolCalError::provider(&self.name, "listing rejected"));
        }
        Ok(state
            .events
            .iter()
            .filter(|e| range.contains(&e.start))
            .cloned()
            .collect())
    }

    async fn remove_event(&self, event: &CalendarEvent) -> SchoolCalResult<()> {
        let mut state = self.state();
        if state.fail_removal.contains(&event.id) {
            return Err(SchoolCalError::provider(&self.name, "delete rejected"));
        }
        state.events.retain(|e| e.id != event.id);
        state.removed.push(event.id.clone());
        Ok(())
    }
}
