//! In-memory calendar store.
//!
//! Holds calendars as plain event lists and records every write, which
//! makes it the provider of choice for exercising the engine.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::date_range::DateRange;
use crate::error::{CalMirrorError, CalMirrorResult};
use crate::event::{CalendarInfo, Event};
use crate::provider::CalendarProvider;

/// A write issued against a [`MemoryProvider`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Create { calendar_id: String, event: Event },
    Delete { calendar_id: String, event_id: String },
}

#[derive(Default)]
struct State {
    calendars: BTreeMap<String, Vec<Event>>,
    operations: Vec<Operation>,
    failing_titles: HashSet<String>,
    next_id: u64,
}

#[derive(Default)]
pub struct MemoryProvider {
    state: Mutex<State>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_calendar(&self, calendar_id: &str) {
        self.state()
            .calendars
            .entry(calendar_id.to_string())
            .or_default();
    }

    /// Store `event` directly, bypassing the operation log. Events without
    /// an id get one assigned. Returns the stored id.
    pub fn insert(&self, calendar_id: &str, mut event: Event) -> String {
        let mut state = self.state();
        if event.id.is_empty() {
            state.next_id += 1;
            event.id = format!("mem-{}", state.next_id);
        }
        let id = event.id.clone();
        let events = state.calendars.entry(calendar_id.to_string()).or_default();
        events.retain(|e| e.id != id);
        events.push(event);
        id
    }

    /// Remove an event directly, bypassing the operation log.
    pub fn remove(&self, calendar_id: &str, event_id: &str) {
        if let Some(events) = self.state().calendars.get_mut(calendar_id) {
            events.retain(|e| e.id != event_id);
        }
    }

    pub fn events(&self, calendar_id: &str) -> Vec<Event> {
        self.state()
            .calendars
            .get(calendar_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.state().operations.clone()
    }

    pub fn clear_operations(&self) {
        self.state().operations.clear();
    }

    /// Make every create of an event titled `title` fail.
    pub fn fail_creates_titled(&self, title: &str) {
        self.state().failing_titles.insert(title.to_string());
    }
}

impl CalendarProvider for MemoryProvider {
    async fn resolve_calendar(&self, calendar_id: &str) -> CalMirrorResult<Option<CalendarInfo>> {
        let known = self.state().calendars.contains_key(calendar_id);
        Ok(known.then(|| CalendarInfo {
            id: calendar_id.to_string(),
            name: None,
        }))
    }

    /// All-day events are placed in UTC.
    async fn list_events(&self, calendar_id: &str, range: &DateRange) -> CalMirrorResult<Vec<Event>> {
        let state = self.state();
        let events = state
            .calendars
            .get(calendar_id)
            .ok_or_else(|| CalMirrorError::CalendarNotFound(calendar_id.to_string()))?;

        Ok(events
            .iter()
            .filter(|e| e.overlaps(range, &chrono_tz::UTC))
            .cloned()
            .collect())
    }

    async fn create_event(&self, calendar_id: &str, event: &Event) -> CalMirrorResult<Event> {
        let mut state = self.state();
        if state.failing_titles.contains(&event.summary) {
            return Err(CalMirrorError::Provider(format!(
                "Refused to create '{}'",
                event.summary
            )));
        }
        if !state.calendars.contains_key(calendar_id) {
            return Err(CalMirrorError::CalendarNotFound(calendar_id.to_string()));
        }

        state.next_id += 1;
        let mut created = event.clone();
        created.id = format!("mem-{}", state.next_id);

        state.operations.push(Operation::Create {
            calendar_id: calendar_id.to_string(),
            event: created.clone(),
        });
        if let Some(events) = state.calendars.get_mut(calendar_id) {
            events.push(created.clone());
        }

        Ok(created)
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> CalMirrorResult<()> {
        let mut state = self.state();
        let events = state
            .calendars
            .get_mut(calendar_id)
            .ok_or_else(|| CalMirrorError::CalendarNotFound(calendar_id.to_string()))?;

        let before = events.len();
        events.retain(|e| e.id != event_id);
        if events.len() == before {
            return Err(CalMirrorError::Provider(format!(
                "No event '{}' in {}",
                event_id, calendar_id
            )));
        }

        state.operations.push(Operation::Delete {
            calendar_id: calendar_id.to_string(),
            event_id: event_id.to_string(),
        });

        Ok(())
    }
}
