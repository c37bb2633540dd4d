//! Google Calendar adapter for schoolcal.
//!
//! The adapter manages its own credentials and tokens:
//!   ~/.config/schoolcal/google/credentials.json
//!   ~/.config/schoolcal/google/token.toml

mod app_config;
mod auth;
mod calendar;
mod convert;
mod session;

pub use calendar::{DEFAULT_CALENDAR_ID, GoogleCalendar};
