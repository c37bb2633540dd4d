//! Provider wiring.
//!
//! Each enabled provider signs in once at startup and the resulting
//! adapters are reused for the whole run. A provider that cannot sign in
//! is reported and skipped; the run only fails when none are left.

use anyhow::Result;
use chrono_tz::Tz;
use schoolcal_core::console::Console;
use schoolcal_core::port::CalendarPort;
use schoolcal_provider_google::GoogleCalendar;
use schoolcal_provider_outlook::OutlookCalendar;
use tracing::warn;

use crate::config::Config;

pub async fn connect_all(cfg: &Config, timezone: Tz, console: &mut Console) -> Result<Vec<Box<dyn CalendarPort>>> {
    let mut providers: Vec<Box<dyn CalendarPort>> = Vec::new();

    if cfg.outlook.enabled {
        match OutlookCalendar::connect(timezone).await {
            Ok(outlook) => providers.push(Box::new(outlook)),
            Err(e) => skip(console, "Outlook", &e),
        }
    }

    if cfg.google.enabled {
        match GoogleCalendar::connect(&cfg.google.calendar_ids).await {
            Ok(calendars) => {
                for calendar in calendars {
                    providers.push(Box::new(calendar));
                }
            }
            Err(e) => skip(console, "Google Calendar", &e),
        }
    }

    if providers.is_empty() {
        anyhow::bail!(
            "No calendar provider available.\n\
            Enable at least one in {} and check its credentials.",
            crate::config::config_path()?.display()
        );
    }

    Ok(providers)
}

fn skip(console: &mut Console, name: &str, err: &anyhow::Error) {
    warn!(provider = name, error = %format!("{:#}", err), "provider unavailable");
    console.line(format_args!("Skipping {}: {:#}", name, err));
}
