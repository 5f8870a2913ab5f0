//! Holiday/weekend classification.
//!
//! Decides whether a date counts as a non-working day for auto-sync. A date
//! is non-working when it is a configured weekend day, when the public
//! holiday feed has a (non-ignored) event on it, or when the work calendar
//! has an all-day event matching a custom holiday keyword.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::date_range::DateRange;
use crate::event::{CalendarInfo, Event};
use crate::policy::KeywordMatcher;
use crate::provider::CalendarProvider;
use crate::tags::is_mirror;

const SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Maps a day number (Sunday = 0 ... Saturday = 6) to a weekday.
pub fn weekday_from_sunday(n: u8) -> Option<Weekday> {
    SUNDAY_FIRST.get(usize::from(n)).copied()
}

#[derive(Debug, Clone)]
pub struct HolidayRules {
    pub weekend_days: Vec<Weekday>,
    pub holiday_calendar_id: String,
    /// Feed events whose title contains one of these are not holidays.
    pub ignore_words: KeywordMatcher,
    pub custom_keywords: KeywordMatcher,
    pub work_calendar_id: Option<String>,
    pub timezone: Tz,
}

/// Run-scoped classifier. Calendar handles are resolved on first use and
/// kept for the rest of the run, as are per-date answers.
#[derive(Debug)]
pub struct HolidayClassifier {
    rules: HolidayRules,
    holiday_calendar: Option<Option<CalendarInfo>>,
    work_calendar: Option<Option<CalendarInfo>>,
    memo: HashMap<NaiveDate, bool>,
}

impl HolidayClassifier {
    pub fn new(rules: HolidayRules) -> Self {
        HolidayClassifier {
            rules,
            holiday_calendar: None,
            work_calendar: None,
            memo: HashMap::new(),
        }
    }

    pub fn rules(&self) -> &HolidayRules {
        &self.rules
    }

    /// True when `date` is a weekend day, public holiday or custom holiday.
    pub async fn classify<P: CalendarProvider>(&mut self, provider: &P, date: NaiveDate) -> bool {
        if self.is_weekend(date) {
            return true;
        }
        if let Some(&known) = self.memo.get(&date) {
            return known;
        }

        let result =
            self.is_public_holiday(provider, date).await || self.is_custom_holiday(provider, date).await;
        self.memo.insert(date, result);
        result
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        self.rules.weekend_days.contains(&date.weekday())
    }

    async fn is_public_holiday<P: CalendarProvider>(&mut self, provider: &P, date: NaiveDate) -> bool {
        let Some(calendar) = resolve_cached(
            provider,
            &mut self.holiday_calendar,
            &self.rules.holiday_calendar_id,
            "holiday",
        )
        .await
        else {
            return false;
        };

        let events = events_on(provider, &calendar, date, &self.rules.timezone).await;
        events.iter().any(|e| {
            let ignored = self.rules.ignore_words.matches(&e.summary);
            if ignored {
                debug!("Ignoring observance '{}' on {}", e.summary, date);
            }
            !ignored
        })
    }

    async fn is_custom_holiday<P: CalendarProvider>(&mut self, provider: &P, date: NaiveDate) -> bool {
        if self.rules.custom_keywords.is_empty() {
            return false;
        }
        let Some(work_calendar_id) = self.rules.work_calendar_id.as_deref() else {
            return false;
        };
        let Some(calendar) =
            resolve_cached(provider, &mut self.work_calendar, work_calendar_id, "work").await
        else {
            return false;
        };

        let events = events_on(provider, &calendar, date, &self.rules.timezone).await;
        // Mirrors on the work calendar are ours, not organizational holidays
        events
            .iter()
            .any(|e| {
                e.is_all_day() && !is_mirror(e) && self.rules.custom_keywords.matches(&e.summary)
            })
    }
}

async fn resolve_cached<P: CalendarProvider>(
    provider: &P,
    slot: &mut Option<Option<CalendarInfo>>,
    calendar_id: &str,
    label: &str,
) -> Option<CalendarInfo> {
    if let Some(cached) = slot {
        return cached.clone();
    }

    let resolved = match provider.resolve_calendar(calendar_id).await {
        Ok(Some(info)) => Some(info),
        Ok(None) => {
            warn!("{} calendar '{}' not found; skipping that check", label, calendar_id);
            None
        }
        Err(e) => {
            warn!("Could not resolve {} calendar '{}': {}", label, calendar_id, e);
            None
        }
    };

    *slot = Some(resolved.clone());
    resolved
}

async fn events_on<P: CalendarProvider>(
    provider: &P,
    calendar: &CalendarInfo,
    date: NaiveDate,
    tz: &Tz,
) -> Vec<Event> {
    match provider.list_events(&calendar.id, &DateRange::day(date, tz)).await {
        Ok(events) => events.into_iter().filter(|e| e.occurs_on(date, tz)).collect(),
        Err(e) => {
            warn!("Could not list events of {} for {}: {}", calendar, date, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use crate::provider::MemoryProvider;
    use crate::tags::{ORIGIN_ID, SOURCE_CALENDAR_ID};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    const FEED: &str = "holidays";
    const WORK: &str = "work";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn all_day(summary: &str, date: NaiveDate) -> Event {
        Event {
            id: String::new(),
            summary: summary.into(),
            description: None,
            start: EventTime::Date(date),
            end: EventTime::Date(date.succ_opt().unwrap()),
            updated: Utc::now(),
            tags: BTreeMap::new(),
        }
    }

    fn rules(ignore: &[&str], custom: &[&str]) -> HolidayRules {
        HolidayRules {
            weekend_days: vec![Weekday::Sun, Weekday::Sat],
            holiday_calendar_id: FEED.into(),
            ignore_words: KeywordMatcher::new(ignore),
            custom_keywords: KeywordMatcher::new(custom),
            work_calendar_id: Some(WORK.into()),
            timezone: chrono_tz::UTC,
        }
    }

    fn provider() -> MemoryProvider {
        let provider = MemoryProvider::new();
        provider.add_calendar(FEED);
        provider.add_calendar(WORK);
        provider
    }

    #[test]
    fn test_weekday_numbers_start_on_sunday() {
        assert_eq!(weekday_from_sunday(0), Some(Weekday::Sun));
        assert_eq!(weekday_from_sunday(6), Some(Weekday::Sat));
        assert_eq!(weekday_from_sunday(7), None);
    }

    #[tokio::test]
    async fn test_weekend_is_non_working() {
        let mut classifier = HolidayClassifier::new(rules(&[], &[]));

        // 2025-10-25 is a Saturday
        assert!(classifier.classify(&provider(), ymd(2025, 10, 25)).await);
        assert!(!classifier.classify(&provider(), ymd(2025, 10, 24)).await);
    }

    #[tokio::test]
    async fn test_public_holiday_counts() {
        let provider = provider();
        provider.insert(FEED, all_day("Culture Day", ymd(2025, 11, 3)));
        let mut classifier = HolidayClassifier::new(rules(&[], &[]));

        assert!(classifier.classify(&provider, ymd(2025, 11, 3)).await);
        assert!(!classifier.classify(&provider, ymd(2025, 11, 4)).await);
    }

    #[tokio::test]
    async fn test_ignored_observance_is_a_working_day() {
        let provider = provider();
        // 2025-10-31 is a Friday
        provider.insert(FEED, all_day("Halloween", ymd(2025, 10, 31)));
        let mut classifier = HolidayClassifier::new(rules(&["Halloween"], &[]));

        assert!(!classifier.classify(&provider, ymd(2025, 10, 31)).await);
    }

    #[tokio::test]
    async fn test_custom_holiday_requires_all_day_event() {
        let provider = provider();
        provider.insert(WORK, all_day("Company Foundation Day", ymd(2025, 11, 5)));
        let start = Utc.with_ymd_and_hms(2025, 11, 6, 10, 0, 0).unwrap();
        provider.insert(
            WORK,
            Event {
                start: EventTime::DateTime(start),
                end: EventTime::DateTime(start + chrono::Duration::hours(1)),
                ..all_day("Foundation Day rehearsal", ymd(2025, 11, 6))
            },
        );
        let mut classifier = HolidayClassifier::new(rules(&[], &["Foundation Day"]));

        assert!(classifier.classify(&provider, ymd(2025, 11, 5)).await);
        assert!(!classifier.classify(&provider, ymd(2025, 11, 6)).await);
    }

    #[tokio::test]
    async fn test_masked_mirror_is_not_a_custom_holiday() {
        let provider = provider();
        let mut mirror = all_day("休暇", ymd(2025, 11, 5));
        mirror.tags.insert(ORIGIN_ID.into(), "life-1".into());
        mirror.tags.insert(SOURCE_CALENDAR_ID.into(), "life".into());
        provider.insert(WORK, mirror);
        let mut classifier = HolidayClassifier::new(rules(&[], &["休暇"]));

        // 2025-11-05 is a Wednesday
        assert!(!classifier.classify(&provider, ymd(2025, 11, 5)).await);
    }

    #[tokio::test]
    async fn test_custom_holiday_skipped_without_keywords() {
        let provider = provider();
        provider.insert(WORK, all_day("Company Foundation Day", ymd(2025, 11, 5)));
        let mut classifier = HolidayClassifier::new(rules(&[], &[]));

        assert!(!classifier.classify(&provider, ymd(2025, 11, 5)).await);
    }

    #[tokio::test]
    async fn test_missing_feed_is_no_signal() {
        let provider = MemoryProvider::new();
        let mut classifier = HolidayClassifier::new(rules(&[], &["Foundation Day"]));

        assert!(!classifier.classify(&provider, ymd(2025, 11, 3)).await);
        assert_eq!(classifier.holiday_calendar, Some(None));
        assert_eq!(classifier.work_calendar, Some(None));
    }
}
