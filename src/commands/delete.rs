use schoolcal_core::console::Console;
use schoolcal_core::error::SchoolCalResult;
use schoolcal_core::port::{CalendarPort, DeleteOutcome};
use schoolcal_core::schedule::Schedule;
use tracing::debug;

/// Remove scheduled events from every provider, one entry at a time.
///
/// Each entry only clears Monday 00:00 to Friday 23:59 of its earliest
/// week. Events from later weeks of the same entry are left alone.
pub async fn run(
    schedule: &Schedule,
    providers: &[Box<dyn CalendarPort>],
    dry: bool,
    console: &mut Console,
) -> SchoolCalResult<Vec<DeleteOutcome>> {
    // Validate every range before touching any provider
    let ranges = schedule
        .entries
        .iter()
        .map(|entry| schedule.clear_range(entry).map(|range| (entry, range)))
        .collect::<SchoolCalResult<Vec<_>>>()?;

    let mut outcomes = Vec::with_capacity(ranges.len() * providers.len());
    for (entry, range) in &ranges {
        debug!(
            subject = entry.subject(),
            from = %range.from(),
            to = %range.to(),
            "clearing entry"
        );
        for provider in providers {
            let outcome = provider.delete_events(range, entry.subject(), dry, console).await;
            outcomes.push(outcome);
        }
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Europe::Oslo;
    use schoolcal_core::console::{MemoryOutput, ScriptedPrompter};
    use schoolcal_core::schedule::ScheduleEntry;
    use schoolcal_core::testing::FakeCalendar;
    use std::sync::Arc;

    fn schedule() -> Schedule {
        let entry = ScheduleEntry::new([2, 5], "07:30", "Drop-off").unwrap();
        Schedule::new(2025, Oslo, vec![entry]).unwrap()
    }

    /// Drop-offs on Monday of week 2 and Monday of week 5, plus an
    /// unrelated event in week 2.
    fn seeded(name: &str) -> Arc<FakeCalendar> {
        let fake = Arc::new(FakeCalendar::new(name));
        fake.seed("Drop-off", Utc.with_ymd_and_hms(2025, 1, 13, 6, 30, 0).unwrap());
        fake.seed("Drop-off", Utc.with_ymd_and_hms(2025, 2, 3, 6, 30, 0).unwrap());
        fake.seed("Dentist", Utc.with_ymd_and_hms(2025, 1, 14, 9, 0, 0).unwrap());
        fake
    }

    #[tokio::test]
    async fn dry_run_lists_only_the_first_week_and_deletes_nothing() {
        let fake = seeded("Outlook");
        let ports: Vec<Box<dyn CalendarPort>> = vec![Box::new(Arc::clone(&fake))];
        let out = MemoryOutput::default();
        let prompter = ScriptedPrompter::new(["yes"]);
        let asked = prompter.asked();
        let mut console = Console::new(out.clone(), prompter);

        let outcomes = run(&schedule(), &ports, true, &mut console).await.unwrap();

        assert_eq!(outcomes, vec![DeleteOutcome::DryRun { candidates: 1 }]);
        assert!(fake.removed().is_empty());
        assert_eq!(fake.remaining(), 3);
        assert!(asked.lock().unwrap().is_empty());
        assert_eq!(
            out.lines(),
            vec![
                "Found 1 Outlook events to be deleted:",
                "  2025-01-13 07:30 CET Drop-off [fake-1]",
                "Dry run - not proceeding.",
            ]
        );
    }

    #[tokio::test]
    async fn confirmed_run_clears_every_provider() {
        let outlook = seeded("Outlook");
        let google = seeded("Google Calendar");
        let ports: Vec<Box<dyn CalendarPort>> =
            vec![Box::new(Arc::clone(&outlook)), Box::new(Arc::clone(&google))];
        let mut console = Console::new(MemoryOutput::default(), ScriptedPrompter::new(["yes", "yes"]));

        let outcomes = run(&schedule(), &ports, false, &mut console).await.unwrap();

        assert_eq!(outcomes.iter().map(DeleteOutcome::deleted).sum::<usize>(), 2);
        assert_eq!(outlook.removed(), vec!["fake-1"]);
        assert_eq!(google.removed(), vec!["fake-1"]);
        // week 5 and the unrelated event survive
        assert_eq!(outlook.remaining(), 2);
    }

    #[tokio::test]
    async fn listing_failure_on_one_provider_does_not_stop_the_other() {
        let outlook = seeded("Outlook");
        outlook.fail_listing();
        let google = seeded("Google Calendar");
        let ports: Vec<Box<dyn CalendarPort>> =
            vec![Box::new(Arc::clone(&outlook)), Box::new(Arc::clone(&google))];
        let out = MemoryOutput::default();
        let mut console = Console::new(out.clone(), ScriptedPrompter::new(["yes"]));

        let outcomes = run(&schedule(), &ports, false, &mut console).await.unwrap();

        assert_eq!(outcomes[0], DeleteOutcome::Failed);
        assert_eq!(outcomes[1], DeleteOutcome::Deleted { deleted: 1, failed: 0 });
        assert!(out.contents().contains("An error occurred in Outlook: Outlook error: listing rejected"));
    }
}
