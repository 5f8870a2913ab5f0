//! Provider-neutral event types.
//!
//! Providers convert their API responses into these types, and the
//! reconciliation engine works exclusively with them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;

/// A calendar as resolved by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl fmt::Display for CalendarInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", name, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// A calendar event (provider-neutral)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Provider-assigned identifier. Empty for events not yet created.
    #[serde(default)]
    pub id: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventTime,
    /// Exclusive end. For all-day events this is the day after the last day.
    pub end: EventTime,
    /// Last modification timestamp
    pub updated: DateTime<Utc>,
    /// Small string key/value store attached to the event
    /// (Google's private extended properties, X- properties elsewhere).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl EventTime {
    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// The calendar date this time falls on in `tz`.
    pub fn date_in(&self, tz: &Tz) -> NaiveDate {
        match self {
            EventTime::DateTime(dt) => dt.with_timezone(tz).date_naive(),
            EventTime::Date(d) => *d,
        }
    }

    /// The instant this time denotes; dates resolve to local midnight in `tz`.
    pub fn to_utc(&self, tz: &Tz) -> DateTime<Utc> {
        match self {
            EventTime::DateTime(dt) => *dt,
            EventTime::Date(d) => local_midnight(*d, tz),
        }
    }
}

pub(crate) fn local_midnight(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

impl Event {
    pub fn is_all_day(&self) -> bool {
        self.start.is_date()
    }

    /// Whether the event covers `date`.
    ///
    /// All-day events cover the dates in `[start, end)`; timed events cover
    /// every local day they overlap.
    pub fn occurs_on(&self, date: NaiveDate, tz: &Tz) -> bool {
        match (&self.start, &self.end) {
            (EventTime::Date(start), EventTime::Date(end)) => {
                *start <= date && (date < *end || start == end)
            }
            (EventTime::Date(start), EventTime::DateTime(_)) => *start == date,
            _ => self.overlaps(&DateRange::day(date, tz), tz),
        }
    }

    /// Whether any part of the event lies inside `range`.
    pub fn overlaps(&self, range: &DateRange, tz: &Tz) -> bool {
        let start = self.start.to_utc(tz);
        let end = self.end.to_utc(tz).max(start);
        if start == end {
            return range.contains(start);
        }
        start < range.to && end > range.from
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary)
    }
}
