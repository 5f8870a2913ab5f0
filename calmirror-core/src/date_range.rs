//! Date range for filtering events.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::event::local_midnight;

/// Half-open instant range `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// The sync window: `days` days ahead of `now`, clamped to the latest
    /// representable instant.
    pub fn upcoming(now: DateTime<Utc>, days: i64) -> Self {
        let to = Duration::try_days(days)
            .and_then(|span| now.checked_add_signed(span))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        DateRange { from: now, to }
    }

    /// The local calendar day `date` in `tz`.
    pub fn day(date: NaiveDate, tz: &Tz) -> Self {
        let next = date.succ_opt().unwrap_or(date);
        DateRange {
            from: local_midnight(date, tz),
            to: local_midnight(next, tz),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.from && instant < self.to
    }

    pub fn from_rfc3339(&self) -> String {
        self.from.to_rfc3339()
    }

    pub fn to_rfc3339(&self) -> String {
        self.to.to_rfc3339()
    }
}
