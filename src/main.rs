mod commands;
mod config;
mod logging;
mod provider;
mod schedule;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use schoolcal_core::console::Console;
use schoolcal_core::port::DeleteOutcome;
use tracing::info;

/// The literal second argument that turns off dry-run mode
const DOIT: &str = "doit";

#[derive(Parser)]
#[command(name = "schoolcal")]
#[command(about = "Create or clear school pick-up/drop-off reminders in Outlook and Google Calendar")]
struct Cli {
    /// What to do with the scheduled events
    action: Action,

    /// Pass `doit` to act for real; anything else is a dry run
    mode: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Action {
    /// Create every scheduled event
    Add,
    /// Delete scheduled events from each entry's first week
    Delete,
}

impl Cli {
    fn dry(&self) -> bool {
        self.mode.as_deref() != Some(DOIT)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let schedule = schedule::load()?;
    let cfg = config::load_config()?;
    let dry = cli.dry();

    let mut console = Console::stdio();
    console.line(format_args!("Dry run: {}", dry));

    let providers = provider::connect_all(&cfg, schedule.timezone, &mut console).await?;

    match cli.action {
        Action::Add => {
            console.line("Adding events to calendars");
            let summary = commands::add::run(&schedule, &providers, dry, &mut console).await?;
            info!(
                planned = summary.planned,
                created = summary.created,
                failed = summary.failed,
                cancelled = summary.cancelled,
                "add finished"
            );
        }
        Action::Delete => {
            console.line("Deleting events from calendars");
            let outcomes = commands::delete::run(&schedule, &providers, dry, &mut console).await?;
            let deleted: usize = outcomes.iter().map(DeleteOutcome::deleted).sum();
            info!(deleted, "delete finished");
        }
    }

    if dry {
        console.line("Done with dry run.");
    } else {
        console.line("Done with real run.");
    }

    Ok(())
}
