use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::event::Event;
use crate::tags::MirrorTags;

/// Mirrors on the target calendar that were derived from one source
/// calendar, keyed by origin id.
///
/// Entries are taken out as the upsert phase accounts for them; whatever
/// is left afterwards is deleted.
#[derive(Debug, Default)]
pub struct TargetIndex {
    by_origin: HashMap<String, Event>,
    /// Extra mirrors of an origin that is already indexed.
    duplicates: Vec<Event>,
}

impl TargetIndex {
    pub fn build(target_events: Vec<Event>, source_calendar_id: &str) -> Self {
        let mut index = TargetIndex::default();

        for event in target_events {
            let Some(tags) = MirrorTags::decode(&event.tags) else {
                continue;
            };
            if !tags.is_from(source_calendar_id) {
                continue;
            }

            match index.by_origin.entry(tags.origin_id) {
                Entry::Vacant(slot) => {
                    slot.insert(event);
                }
                Entry::Occupied(_) => index.duplicates.push(event),
            }
        }

        index
    }

    /// Remove and return the mirror of `origin_id`.
    pub fn take(&mut self, origin_id: &str) -> Option<Event> {
        self.by_origin.remove(origin_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_origin.len() + self.duplicates.len()
    }

    /// Everything not taken, ordered by start then id.
    pub fn into_remaining(self) -> Vec<Event> {
        let mut remaining: Vec<Event> = self
            .by_origin
            .into_values()
            .chain(self.duplicates)
            .collect();

        remaining.sort_by(|a, b| {
            a.start
                .to_utc(&chrono_tz::UTC)
                .cmp(&b.start.to_utc(&chrono_tz::UTC))
                .then_with(|| a.id.cmp(&b.id))
        });
        remaining
    }
}
