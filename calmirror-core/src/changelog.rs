//! Human-readable record of what a run changed.
//!
//! Entries accumulate across both directions of a run and are flushed to
//! the notification reporter at the end.

use std::fmt;

use chrono_tz::Tz;
use tracing::{error, info};

use crate::event::EventTime;
use crate::reconcile::DiffKind;

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEntry {
    pub kind: DiffKind,
    pub title: String,
    /// Start of the affected event, formatted in the run's time zone.
    pub when: String,
    pub dry_run: bool,
    pub error: Option<String>,
}

impl ChangeEntry {
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

impl fmt::Display for ChangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(err) = &self.error {
            return write!(
                f,
                "⚠️ Failed to {}: {} ({}): {}",
                self.kind.verb(),
                self.title,
                self.when,
                err
            );
        }
        if self.dry_run {
            write!(
                f,
                "[DRY_RUN] {} Would {}: {} ({})",
                self.kind.emoji(),
                self.kind.verb(),
                self.title,
                self.when
            )
        } else {
            write!(
                f,
                "{} {}: {} ({})",
                self.kind.emoji(),
                self.kind.done(),
                self.title,
                self.when
            )
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChangeLog {
    tz: Tz,
    entries: Vec<ChangeEntry>,
}

impl ChangeLog {
    pub fn new(tz: Tz) -> Self {
        ChangeLog {
            tz,
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, kind: DiffKind, title: &str, start: &EventTime, dry_run: bool) {
        let entry = ChangeEntry {
            kind,
            title: title.to_string(),
            when: self.format_start(start),
            dry_run,
            error: None,
        };
        info!("{}", entry);
        self.entries.push(entry);
    }

    pub fn record_failure(&mut self, kind: DiffKind, title: &str, start: &EventTime, reason: &str) {
        let entry = ChangeEntry {
            kind,
            title: title.to_string(),
            when: self.format_start(start),
            dry_run: false,
            error: Some(reason.to_string()),
        };
        error!("{}", entry);
        self.entries.push(entry);
    }

    /// `MM/dd HH:mm` for timed events, `MM/dd` for all-day ones.
    fn format_start(&self, start: &EventTime) -> String {
        match start {
            EventTime::DateTime(dt) => dt.with_timezone(&self.tz).format("%m/%d %H:%M").to_string(),
            EventTime::Date(d) => d.format("%m/%d").to_string(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.is_failure()).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
