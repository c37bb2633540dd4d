//! The calendar port: what every provider adapter must offer.
//!
//! Adapters implement three primitives (create, list, remove). Deleting by
//! subject is layered on top once, in [`CalendarPort::delete_events`], so
//! the dry-run flag and the interactive confirmation gate behave the same
//! for every provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::console::{Confirmation, Console};
use crate::date_range::DateRange;
use crate::error::SchoolCalResult;
use crate::event::{CalendarEvent, NewEvent};

pub const DELETE_PROMPT: &str = "Proceed and delete those events? [yes/*]";

/// What a [`CalendarPort::delete_events`] call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The provider returned no events at all for the range.
    NoEvents,
    /// Events exist, none with the subject.
    NoMatches,
    DryRun { candidates: usize },
    Cancelled { candidates: usize },
    Deleted { deleted: usize, failed: usize },
    /// Listing the provider's events failed.
    Failed,
}

impl DeleteOutcome {
    pub fn deleted(&self) -> usize {
        match self {
            DeleteOutcome::Deleted { deleted, .. } => *deleted,
            _ => 0,
        }
    }
}

#[async_trait]
pub trait CalendarPort: Send + Sync {
    /// Display name used in console output, e.g. "Outlook".
    fn name(&self) -> &str;

    /// Create exactly one event.
    async fn create_event(&self, event: &NewEvent) -> SchoolCalResult<CalendarEvent>;

    /// Events whose start falls within `range`. Providers without a
    /// server-side range query filter client side.
    async fn list_events(&self, range: &DateRange) -> SchoolCalResult<Vec<CalendarEvent>>;

    async fn remove_event(&self, event: &CalendarEvent) -> SchoolCalResult<()>;

    /// Delete events in `range` whose subject is exactly `subject`.
    ///
    /// Candidates are always listed. Nothing is removed unless `dry` is
    /// false and the user answers the prompt with `yes`. Provider errors
    /// are reported on the console and never propagate.
    async fn delete_events(
        &self,
        range: &DateRange,
        subject: &str,
        dry: bool,
        console: &mut Console,
    ) -> DeleteOutcome {
        let name = self.name().to_string();

        let events = match self.list_events(range).await {
            Ok(events) => events,
            Err(e) => {
                warn!(provider = %name, subject, error = %e, "listing events failed");
                console.line(format_args!("An error occurred in {}: {}", name, e));
                return DeleteOutcome::Failed;
            }
        };

        if events.is_empty() {
            console.line(format_args!("No events found in {}.", name));
            return DeleteOutcome::NoEvents;
        }

        let candidates: Vec<CalendarEvent> = events
            .into_iter()
            .filter(|e| e.has_subject(subject) && range.contains(&e.start))
            .collect();

        if candidates.is_empty() {
            console.line(format_args!("No events to delete found in {}.", name));
            return DeleteOutcome::NoMatches;
        }

        console.line(format_args!(
            "Found {} {} events to be deleted:",
            candidates.len(),
            name
        ));
        let tz = range.timezone();
        for event in &candidates {
            console.line(format_args!(
                "  {} {} [{}]",
                event.start.with_timezone(&tz).format(crate::DISPLAY_FORMAT),
                event.subject,
                event.id
            ));
        }

        if dry {
            console.line("Dry run - not proceeding.");
            return DeleteOutcome::DryRun {
                candidates: candidates.len(),
            };
        }

        if console.confirm(DELETE_PROMPT) == Confirmation::Cancelled {
            console.line("Cancelled.");
            return DeleteOutcome::Cancelled {
                candidates: candidates.len(),
            };
        }

        let mut deleted = 0;
        let mut failed = 0;
        for event in &candidates {
            match self.remove_event(event).await {
                Ok(()) => {
                    debug!(provider = %name, id = %event.id, "event deleted");
                    deleted += 1;
                }
                Err(e) => {
                    warn!(provider = %name, id = %event.id, error = %e, "delete failed");
                    console.line(format_args!("Failed to delete {}: {}", event.id, e));
                    failed += 1;
                }
            }
        }

        console.line(format_args!("Deleted {} {} events.", deleted, name));
        DeleteOutcome::Deleted { deleted, failed }
    }
}

/// Shared adapters are ports too.
#[async_trait]
impl<T: CalendarPort + ?Sized> CalendarPort for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn create_event(&self, event: &NewEvent) -> SchoolCalResult<CalendarEvent> {
        (**self).create_event(event).await
    }

    async fn list_events(&self, range: &DateRange) -> SchoolCalResult<Vec<CalendarEvent>> {
        (**self).list_events(range).await
    }

    async fn remove_event(&self, event: &CalendarEvent) -> SchoolCalResult<()> {
        (**self).remove_event(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{MemoryOutput, ScriptedPrompter};
    use crate::testing::FakeCalendar;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Europe::Oslo;

    fn week_two() -> DateRange {
        DateRange::new(
            Oslo.with_ymd_and_hms(2025, 1, 13, 0, 0, 0).unwrap(),
            Oslo.with_ymd_and_hms(2025, 1, 17, 23, 59, 0).unwrap(),
        )
        .unwrap()
    }

    fn seeded() -> FakeCalendar {
        let cal = FakeCalendar::new("Fake");
        cal.seed("Drop-off", Utc.with_ymd_and_hms(2025, 1, 13, 6, 30, 0).unwrap());
        cal.seed("Drop-off", Utc.with_ymd_and_hms(2025, 1, 14, 6, 30, 0).unwrap());
        cal.seed("Pick-up", Utc.with_ymd_and_hms(2025, 1, 14, 14, 30, 0).unwrap());
        // Outside the range
        cal.seed("Drop-off", Utc.with_ymd_and_hms(2025, 1, 20, 6, 30, 0).unwrap());
        cal
    }

    fn scripted_console(answers: &[&str]) -> (Console, MemoryOutput) {
        let out = MemoryOutput::default();
        let prompter = ScriptedPrompter::new(answers.iter().copied());
        (Console::new(out.clone(), prompter), out)
    }

    #[tokio::test]
    async fn no_matches_never_prompts_or_deletes() {
        let cal = seeded();
        let prompter = ScriptedPrompter::new(["yes"]);
        let asked = prompter.asked();
        let out = MemoryOutput::default();
        let mut console = Console::new(out.clone(), prompter);

        let outcome = cal.delete_events(&week_two(), "Swimming", false, &mut console).await;

        assert_eq!(outcome, DeleteOutcome::NoMatches);
        assert!(asked.lock().unwrap().is_empty());
        assert!(cal.removed().is_empty());
        assert_eq!(out.lines(), vec!["No events to delete found in Fake."]);
    }

    #[tokio::test]
    async fn empty_calendar_is_not_an_error() {
        let cal = FakeCalendar::new("Fake");
        let (mut console, out) = scripted_console(&["yes"]);

        let outcome = cal.delete_events(&week_two(), "Drop-off", false, &mut console).await;

        assert_eq!(outcome, DeleteOutcome::NoEvents);
        assert_eq!(out.lines(), vec!["No events found in Fake."]);
    }

    #[tokio::test]
    async fn dry_run_lists_but_never_deletes() {
        let cal = seeded();
        let prompter = ScriptedPrompter::new(["yes"]);
        let asked = prompter.asked();
        let out = MemoryOutput::default();
        let mut console = Console::new(out.clone(), prompter);

        let outcome = cal.delete_events(&week_two(), "Drop-off", true, &mut console).await;

        assert_eq!(outcome, DeleteOutcome::DryRun { candidates: 2 });
        assert!(cal.removed().is_empty());
        assert!(asked.lock().unwrap().is_empty());
        assert_eq!(
            out.lines(),
            vec![
                "Found 2 Fake events to be deleted:",
                "  2025-01-13 07:30 CET Drop-off [fake-1]",
                "  2025-01-14 07:30 CET Drop-off [fake-2]",
                "Dry run - not proceeding.",
            ]
        );
    }

    #[tokio::test]
    async fn anything_but_yes_cancels() {
        for answer in ["", "no", "y", "YES"] {
            let cal = seeded();
            let (mut console, out) = scripted_console(&[answer]);

            let outcome = cal.delete_events(&week_two(), "Drop-off", false, &mut console).await;

            assert_eq!(outcome, DeleteOutcome::Cancelled { candidates: 2 });
            assert!(cal.removed().is_empty());
            assert_eq!(out.lines().last().map(String::as_str), Some("Cancelled."));
        }
    }

    #[tokio::test]
    async fn confirmed_deletes_only_matches_in_range() {
        let cal = seeded();
        let (mut console, out) = scripted_console(&["yes"]);

        let outcome = cal.delete_events(&week_two(), "Drop-off", false, &mut console).await;

        assert_eq!(outcome, DeleteOutcome::Deleted { deleted: 2, failed: 0 });
        assert_eq!(cal.removed(), vec!["fake-1", "fake-2"]);
        assert_eq!(cal.remaining(), 2);
        assert_eq!(out.lines().last().map(String::as_str), Some("Deleted 2 Fake events."));
    }

    #[tokio::test]
    async fn failed_removal_is_reported_and_skipped() {
        let cal = seeded();
        cal.fail_removal_of("fake-1");
        let (mut console, out) = scripted_console(&["yes"]);

        let outcome = cal.delete_events(&week_two(), "Drop-off", false, &mut console).await;

        assert_eq!(outcome, DeleteOutcome::Deleted { deleted: 1, failed: 1 });
        assert_eq!(cal.removed(), vec!["fake-2"]);
        assert!(out.contents().contains("Failed to delete fake-1"));
    }

    #[tokio::test]
    async fn listing_failure_is_reported() {
        let cal = seeded();
        cal.fail_listing();
        let (mut console, out) = scripted_console(&["yes"]);

        let outcome = cal.delete_events(&week_two(), "Drop-off", false, &mut console).await;

        assert_eq!(outcome, DeleteOutcome::Failed);
        assert!(out.contents().starts_with("An error occurred in Fake:"));
    }
}
