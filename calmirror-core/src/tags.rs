//! Provenance tags carried by mirrored events.
//!
//! Every event created by calmirror stores three tags in the provider's
//! per-event key/value store. An event without `origin_id` is an original,
//! human-authored event; anything carrying it is a mirror and is never used
//! as a sync source.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::event::Event;

pub const ORIGIN_ID: &str = "origin_id";
pub const ORIGIN_UPDATED: &str = "origin_updated";
pub const SOURCE_CALENDAR_ID: &str = "source_calendar_id";

/// Decoded provenance of an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Provenance {
    Original,
    Mirror(MirrorTags),
}

/// The provenance record of a mirrored event.
///
/// `origin_updated` and `source_calendar_id` are `None` when the tag is
/// missing or unreadable. Such a mirror is still a mirror.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorTags {
    pub origin_id: String,
    pub origin_updated: Option<DateTime<Utc>>,
    pub source_calendar_id: Option<String>,
}

impl Provenance {
    pub fn of(event: &Event) -> Self {
        match MirrorTags::decode(&event.tags) {
            Some(tags) => Provenance::Mirror(tags),
            None => Provenance::Original,
        }
    }

    pub fn mirror(&self) -> Option<&MirrorTags> {
        match self {
            Provenance::Mirror(tags) => Some(tags),
            Provenance::Original => None,
        }
    }
}

/// Whether `event` was created by calmirror.
pub fn is_mirror(event: &Event) -> bool {
    matches!(Provenance::of(event), Provenance::Mirror(_))
}

impl MirrorTags {
    pub fn new(origin: &Event, source_calendar_id: &str) -> Self {
        MirrorTags {
            origin_id: origin.id.clone(),
            origin_updated: Some(origin.updated),
            source_calendar_id: Some(source_calendar_id.to_string()),
        }
    }

    pub fn decode(tags: &BTreeMap<String, String>) -> Option<Self> {
        let origin_id = tags.get(ORIGIN_ID).filter(|id| !id.is_empty())?;

        let origin_updated = tags
            .get(ORIGIN_UPDATED)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Some(MirrorTags {
            origin_id: origin_id.clone(),
            origin_updated,
            source_calendar_id: tags.get(SOURCE_CALENDAR_ID).cloned(),
        })
    }

    pub fn encode(&self) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        tags.insert(ORIGIN_ID.to_string(), self.origin_id.clone());
        if let Some(updated) = self.origin_updated {
            tags.insert(ORIGIN_UPDATED.to_string(), format_timestamp(&updated));
        }
        if let Some(calendar_id) = &self.source_calendar_id {
            tags.insert(SOURCE_CALENDAR_ID.to_string(), calendar_id.clone());
        }
        tags
    }

    pub fn is_from(&self, source_calendar_id: &str) -> bool {
        self.source_calendar_id.as_deref() == Some(source_calendar_id)
    }

    /// Whether the mirror still reflects an origin last modified at `updated`.
    ///
    /// Compared at millisecond precision, the precision the tag is written in.
    pub fn is_current(&self, updated: &DateTime<Utc>) -> bool {
        self.origin_updated
            .is_some_and(|stored| stored.timestamp_millis() == updated.timestamp_millis())
    }
}

/// Canonical tag serialization: RFC 3339, UTC, milliseconds, `Z` suffix.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use chrono::TimeZone;

    fn event_with_tags(tags: &[(&str, &str)]) -> Event {
        let start = Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap();
        Event {
            id: "evt".into(),
            summary: "Standup".into(),
            description: None,
            start: EventTime::DateTime(start),
            end: EventTime::DateTime(start),
            updated: start,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_event_without_origin_id_is_original() {
        let event = event_with_tags(&[(SOURCE_CALENDAR_ID, "work")]);

        assert!(!is_mirror(&event));
        assert_eq!(Provenance::of(&event), Provenance::Original);
    }

    #[test]
    fn test_malformed_mirror_is_still_a_mirror() {
        let event = event_with_tags(&[(ORIGIN_ID, "abc"), (ORIGIN_UPDATED, "yesterday")]);

        assert!(is_mirror(&event));
        let provenance = Provenance::of(&event);
        let tags = provenance.mirror().unwrap();
        assert_eq!(tags.origin_updated, None);
        assert_eq!(tags.source_calendar_id, None);
        assert!(!tags.is_from("work"));
    }

    #[test]
    fn test_encoded_tags_decode_to_same_record() {
        let origin = event_with_tags(&[]);
        let tags = MirrorTags::new(&origin, "work@example.com");

        let encoded = tags.encode();
        assert_eq!(encoded[ORIGIN_UPDATED], "2025-03-20T09:00:00.000Z");
        assert_eq!(MirrorTags::decode(&encoded), Some(tags));
    }

    #[test]
    fn test_is_current_ignores_serialization_precision() {
        let event = event_with_tags(&[
            (ORIGIN_ID, "abc"),
            (ORIGIN_UPDATED, "2025-03-20T09:00:00Z"),
            (SOURCE_CALENDAR_ID, "work"),
        ]);
        let tags = MirrorTags::decode(&event.tags).unwrap();

        let same = Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap();
        let later = same + chrono::Duration::seconds(1);
        assert!(tags.is_current(&same));
        assert!(!tags.is_current(&later));
    }
}
