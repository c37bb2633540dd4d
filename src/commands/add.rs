use chrono::DateTime;
use chrono_tz::Tz;
use schoolcal_core::console::{Confirmation, Console};
use schoolcal_core::error::SchoolCalResult;
use schoolcal_core::event::NewEvent;
use schoolcal_core::port::CalendarPort;
use schoolcal_core::schedule::{Schedule, ScheduleEntry};
use schoolcal_core::DISPLAY_FORMAT;
use tracing::{debug, warn};

pub const CONFIRM_PROMPT: &str = "Proceed? [yes/*]";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AddSummary {
    /// Resolved dates across all entries and weeks
    pub planned: usize,
    /// Successful create calls, summed over providers
    pub created: usize,
    pub failed: usize,
    pub cancelled: bool,
}

struct PlannedWeek<'a> {
    entry: &'a ScheduleEntry,
    week: u32,
    dates: Vec<DateTime<Tz>>,
}

/// Resolve every week of every entry before anything is created, so a
/// bad entry aborts the run up front.
fn plan(schedule: &Schedule) -> SchoolCalResult<Vec<PlannedWeek<'_>>> {
    let mut weeks = Vec::new();
    for entry in &schedule.entries {
        for week in entry.weeks() {
            weeks.push(PlannedWeek {
                entry,
                week,
                dates: schedule.dates_for(entry, week)?,
            });
        }
    }
    Ok(weeks)
}

/// Create one event per resolved weekday on every provider.
///
/// A real run asks once for consent before creating anything. Dates are
/// printed in both modes. A failed create is reported and the run moves on.
pub async fn run(
    schedule: &Schedule,
    providers: &[Box<dyn CalendarPort>],
    dry: bool,
    console: &mut Console,
) -> SchoolCalResult<AddSummary> {
    let weeks = plan(schedule)?;
    let mut summary = AddSummary {
        planned: weeks.iter().map(|w| w.dates.len()).sum(),
        ..AddSummary::default()
    };

    if !dry {
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        console.line("WARNING");
        console.line(format_args!(
            "{} appointments will be created in: {}",
            summary.planned * providers.len(),
            names.join(", ")
        ));
        if console.confirm(CONFIRM_PROMPT) == Confirmation::Cancelled {
            console.line("Cancelled.");
            summary.cancelled = true;
            return Ok(summary);
        }
    }

    for planned in &weeks {
        console.line(format_args!("Week {}: {}", planned.week, planned.entry.subject()));

        for date in &planned.dates {
            console.line(format_args!("  {}", date.format(DISPLAY_FORMAT)));

            if dry {
                continue;
            }

            let event = NewEvent::new(*date, planned.entry.subject(), planned.entry.duration_minutes());
            for provider in providers {
                match provider.create_event(&event).await {
                    Ok(created) => {
                        debug!(provider = provider.name(), id = %created.id, "event created");
                        let reference = created.link.as_deref().unwrap_or(&created.id);
                        console.line(format_args!("    {} event created: {}", provider.name(), reference));
                        summary.created += 1;
                    }
                    Err(e) => {
                        warn!(
                            provider = provider.name(),
                            subject = %event.subject,
                            start = %event.start,
                            error = %e,
                            "create failed"
                        );
                        console.line(format_args!("    An error occurred: {}", e));
                        summary.failed += 1;
                    }
                }
            }
        }
    }

    if !dry {
        console.line(format_args!(
            "Created {} events, {} failed.",
            summary.created, summary.failed
        ));
    }

    Ok(summary)
}
