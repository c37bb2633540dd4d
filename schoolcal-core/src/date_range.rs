//! Date range for filtering events.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::{SchoolCalError, SchoolCalResult};

/// Closed range `[from, to]` in a named timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    from: DateTime<Tz>,
    to: DateTime<Tz>,
}

impl DateRange {
    pub fn new(from: DateTime<Tz>, to: DateTime<Tz>) -> SchoolCalResult<Self> {
        if to < from {
            return Err(SchoolCalError::validation(format!(
                "Range end {} is before its start {}",
                to, from
            )));
        }
        Ok(DateRange { from, to })
    }

    pub fn from(&self) -> DateTime<Tz> {
        self.from
    }

    pub fn to(&self) -> DateTime<Tz> {
        self.to
    }

    pub fn timezone(&self) -> Tz {
        self.from.timezone()
    }

    /// Inclusive on both ends.
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.from && *instant <= self.to
    }

    pub fn from_rfc3339(&self) -> String {
        self.from.to_rfc3339()
    }

    pub fn to_rfc3339(&self) -> String {
        self.to.to_rfc3339()
    }
}
