//! Outlook adapter for schoolcal.
//!
//! Talks to the signed-in user's default Outlook calendar through the
//! Microsoft Graph API. Credentials live in:
//!   ~/.config/schoolcal/outlook/app_config.toml
//!   ~/.config/schoolcal/outlook/token.toml

mod app_config;
mod auth;
mod calendar;
mod graph;
mod session;

pub use calendar::{GRAPH_BASE_URL, OutlookCalendar};
