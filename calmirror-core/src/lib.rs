//! Core of calmirror: keeps a work calendar and a life calendar in sync.
//!
//! Each run mirrors qualifying events in both directions:
//! - `reconcile` computes and applies the changes for one direction
//! - `holiday` decides which dates are days off
//! - `tags` marks mirrors with their origin so they are never re-mirrored
//! - `notify` posts the run's change log to chat webhooks
//! - `run` drives both directions and the report

pub mod changelog;
pub mod config;
pub mod constants;
pub mod context;
pub mod date_range;
pub mod error;
pub mod event;
pub mod holiday;
pub mod notify;
pub mod policy;
pub mod provider;
pub mod reconcile;
pub mod run;
pub mod tags;

pub use changelog::{ChangeEntry, ChangeLog};
pub use config::Settings;
pub use date_range::DateRange;
pub use error::{CalMirrorError, CalMirrorResult};
pub use event::{CalendarInfo, Event, EventTime};
pub use provider::CalendarProvider;
pub use run::{PassOutcome, RunSummary, run};
