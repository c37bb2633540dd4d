//! Core types for schoolcal.
//!
//! Shared between the CLI and the provider adapters:
//! - `schedule` and `week` turn week numbers into concrete weekday times
//! - `port` defines the create/delete capability each provider implements
//! - `console` carries all user-facing text and confirmation prompts

pub mod console;
pub mod date_range;
pub mod error;
pub mod event;
pub mod oauth;
pub mod port;
pub mod schedule;
pub mod week;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::console::{Confirmation, Console};
pub use crate::date_range::DateRange;
pub use crate::error::{SchoolCalError, SchoolCalResult};
pub use crate::event::{CalendarEvent, NewEvent};
pub use crate::port::{CalendarPort, DeleteOutcome};
pub use crate::schedule::{Schedule, ScheduleEntry};

/// How event times are shown on the console.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M %Z";
