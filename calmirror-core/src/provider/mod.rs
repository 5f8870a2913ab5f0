//! Calendar access.
//!
//! The reconciliation engine talks to calendars only through
//! [`CalendarProvider`]. Two implementations ship with the crate: a client
//! for external provider binaries speaking the JSON protocol in
//! [`protocol`], and an in-memory calendar store.

pub mod memory;
pub mod protocol;
pub mod subprocess;

pub use memory::{MemoryProvider, Operation};
pub use subprocess::SubprocessProvider;

use crate::date_range::DateRange;
use crate::error::CalMirrorResult;
use crate::event::{CalendarInfo, Event};

/// Read/write access to calendars, addressed by calendar id.
#[allow(async_fn_in_trait)]
pub trait CalendarProvider {
    /// Look up a calendar. `Ok(None)` means the id is unknown to the provider.
    async fn resolve_calendar(&self, calendar_id: &str) -> CalMirrorResult<Option<CalendarInfo>>;

    /// Events overlapping `range`.
    async fn list_events(&self, calendar_id: &str, range: &DateRange) -> CalMirrorResult<Vec<Event>>;

    /// Create `event` (timed or all-day, single or multi-day) including its
    /// description and tags. Returns the event with its provider-assigned id.
    async fn create_event(&self, calendar_id: &str, event: &Event) -> CalMirrorResult<Event>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> CalMirrorResult<()>;
}
