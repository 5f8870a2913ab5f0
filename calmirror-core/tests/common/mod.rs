#![allow(dead_code)]

use std::collections::BTreeMap;

use calmirror_core::config::{RawSettings, Settings};
use calmirror_core::notify::Reporter;
use calmirror_core::provider::MemoryProvider;
use calmirror_core::{Event, EventTime, RunSummary, run};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

pub const WORK: &str = "work";
pub const LIFE: &str = "life";
pub const HOLIDAYS: &str = "holidays";

/// Monday 2025-10-27, 00:00 UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 27, 0, 0, 0).unwrap()
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Test settings; keys in `overrides` replace the defaults below.
pub fn settings(overrides: &str) -> Settings {
    let mut table: toml::Table = toml::from_str(&format!(
        r#"
work_calendar_id = "{WORK}"
life_calendar_id = "{LIFE}"
holiday_calendar_id = "{HOLIDAYS}"
timezone = "UTC"
sync_keywords_to_life = ["[Life]"]
sync_keywords_to_work = ["[Work]"]
mask_title_life = "Busy"
holiday_ignore_list = ["Halloween"]
"#
    ))
    .unwrap();
    let overrides: toml::Table = toml::from_str(overrides).unwrap();
    table.extend(overrides);

    let raw: RawSettings = toml::Value::Table(table).try_into().unwrap();
    Settings::try_from(raw).unwrap()
}

pub fn provider() -> MemoryProvider {
    let provider = MemoryProvider::new();
    provider.add_calendar(WORK);
    provider.add_calendar(LIFE);
    provider.add_calendar(HOLIDAYS);
    provider
}

pub fn timed(summary: &str, date: NaiveDate, hour: u32) -> Event {
    let start = Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap());
    Event {
        id: String::new(),
        summary: summary.into(),
        description: None,
        start: EventTime::DateTime(start),
        end: EventTime::DateTime(start + Duration::hours(1)),
        updated: Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap(),
        tags: BTreeMap::new(),
    }
}

pub fn all_day(summary: &str, start: NaiveDate, end: NaiveDate) -> Event {
    Event {
        start: EventTime::Date(start),
        end: EventTime::Date(end),
        ..timed(summary, start, 0)
    }
}

pub async fn sync(provider: &MemoryProvider, settings: &Settings) -> RunSummary {
    let reporter = Reporter::new(Vec::new()).unwrap();
    run::run_at(provider, settings, &reporter, now()).await
}

pub fn summaries(provider: &MemoryProvider, calendar_id: &str) -> Vec<String> {
    let mut titles: Vec<String> = provider
        .events(calendar_id)
        .into_iter()
        .map(|e| e.summary)
        .collect();
    titles.sort();
    titles
}
