use std::fmt;

use chrono::Duration;

use crate::event::{Event, EventTime};
use crate::policy::SyncPolicy;
use crate::reconcile::DiffKind;
use crate::tags::{MirrorTags, format_timestamp};

/// One change to the target calendar.
///
/// `old` is the existing mirror (update/delete), `new` the mirror to create
/// (create/update).
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorDiff {
    pub kind: DiffKind,
    pub old: Option<Event>,
    pub new: Option<Event>,
}

impl fmt::Display for MirrorDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.event() {
            Some(event) => write!(f, "{}: {}", self.kind, event),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl MirrorDiff {
    pub fn create(mirror: Event) -> Self {
        MirrorDiff {
            kind: DiffKind::Create,
            old: None,
            new: Some(mirror),
        }
    }

    pub fn update(stale: Event, mirror: Event) -> Self {
        MirrorDiff {
            kind: DiffKind::Update,
            old: Some(stale),
            new: Some(mirror),
        }
    }

    pub fn delete(orphan: Event) -> Self {
        MirrorDiff {
            kind: DiffKind::Delete,
            old: Some(orphan),
            new: None,
        }
    }

    /// The event to report (prefer new, fallback to old).
    pub fn event(&self) -> Option<&Event> {
        self.new.as_ref().or(self.old.as_ref())
    }
}

/// Build the mirror of `origin` for the target calendar.
pub fn build_mirror(origin: &Event, policy: &SyncPolicy, source_calendar_id: &str) -> Event {
    let tags = MirrorTags::new(origin, source_calendar_id);
    let (start, end) = mirror_span(origin);

    Event {
        id: String::new(),
        summary: policy.title().title_for(&origin.summary).to_string(),
        description: Some(format!(
            "Auto-synced by calmirror.\nOriginal Update: {}",
            format_timestamp(&origin.updated)
        )),
        start,
        end,
        updated: origin.updated,
        tags: tags.encode(),
    }
}

/// Start and end of the mirror.
///
/// All-day spans longer than one day are kept as is; anything shorter
/// becomes a single all-day event. Timed events keep their instants.
fn mirror_span(origin: &Event) -> (EventTime, EventTime) {
    match (origin.start, origin.end) {
        (EventTime::Date(start), EventTime::Date(end))
            if end.signed_duration_since(start) > Duration::days(1) =>
        {
            (EventTime::Date(start), EventTime::Date(end))
        }
        (EventTime::Date(start), _) => {
            let next = start.succ_opt().unwrap_or(start);
            (EventTime::Date(start), EventTime::Date(next))
        }
        (start, end) => (start, end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{KeywordMatcher, TitleMode};
    use crate::tags::{ORIGIN_ID, ORIGIN_UPDATED, SOURCE_CALENDAR_ID};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn origin(start: EventTime, end: EventTime) -> Event {
        Event {
            id: "src-1".into(),
            summary: "Family trip".into(),
            description: Some("Private notes".into()),
            start,
            end,
            updated: Utc.with_ymd_and_hms(2025, 4, 1, 8, 30, 0).unwrap(),
            tags: BTreeMap::new(),
        }
    }

    fn policy(title: TitleMode) -> SyncPolicy {
        SyncPolicy::new(KeywordMatcher::default(), title, false, false).unwrap()
    }

    #[test]
    fn test_multi_day_span_is_preserved() {
        let source = origin(EventTime::Date(ymd(2025, 5, 3)), EventTime::Date(ymd(2025, 5, 6)));

        let mirror = build_mirror(&source, &policy(TitleMode::Verbatim), "life");

        assert_eq!(mirror.start, EventTime::Date(ymd(2025, 5, 3)));
        assert_eq!(mirror.end, EventTime::Date(ymd(2025, 5, 6)));
    }

    #[test]
    fn test_single_day_stays_single_day() {
        let source = origin(EventTime::Date(ymd(2025, 5, 3)), EventTime::Date(ymd(2025, 5, 4)));

        let mirror = build_mirror(&source, &policy(TitleMode::Verbatim), "life");

        assert_eq!(mirror.start, EventTime::Date(ymd(2025, 5, 3)));
        assert_eq!(mirror.end, EventTime::Date(ymd(2025, 5, 4)));
    }

    #[test]
    fn test_zero_length_all_day_becomes_single_day() {
        let source = origin(EventTime::Date(ymd(2025, 5, 3)), EventTime::Date(ymd(2025, 5, 3)));

        let mirror = build_mirror(&source, &policy(TitleMode::Verbatim), "life");

        assert_eq!(mirror.end, EventTime::Date(ymd(2025, 5, 4)));
    }

    #[test]
    fn test_mirror_carries_tags_and_masked_title() {
        let start = Utc.with_ymd_and_hms(2025, 5, 7, 1, 0, 0).unwrap();
        let end = start + Duration::hours(2);
        let source = origin(EventTime::DateTime(start), EventTime::DateTime(end));

        let mirror = build_mirror(&source, &policy(TitleMode::Masked("Busy".into())), "life");

        assert_eq!(mirror.summary, "Busy");
        assert_eq!(mirror.start, EventTime::DateTime(start));
        assert_eq!(mirror.end, EventTime::DateTime(end));
        assert_eq!(mirror.tags[ORIGIN_ID], "src-1");
        assert_eq!(mirror.tags[ORIGIN_UPDATED], "2025-04-01T08:30:00.000Z");
        assert_eq!(mirror.tags[SOURCE_CALENDAR_ID], "life");
        assert_eq!(
            mirror.description.as_deref(),
            Some("Auto-synced by calmirror.\nOriginal Update: 2025-04-01T08:30:00.000Z")
        );
    }

    #[test]
    fn test_display_shows_symbol_and_title() {
        let source = origin(EventTime::Date(ymd(2025, 5, 3)), EventTime::Date(ymd(2025, 5, 4)));
        let mirror = build_mirror(&source, &policy(TitleMode::Verbatim), "life");

        assert_eq!(MirrorDiff::create(mirror.clone()).to_string(), "+: Family trip");
        assert_eq!(MirrorDiff::delete(mirror).to_string(), "-: Family trip");
    }
}
