use chrono::{DateTime, Utc};

use crate::changelog::ChangeLog;
use crate::config::Settings;
use crate::date_range::DateRange;
use crate::holiday::HolidayClassifier;

/// State shared by both passes of one run.
///
/// The classifier's caches and the change log live exactly as long as the
/// run; nothing carries over to the next one.
#[derive(Debug)]
pub struct RunContext {
    pub window: DateRange,
    pub dry_run: bool,
    pub change_log: ChangeLog,
    pub classifier: HolidayClassifier,
}

impl RunContext {
    /// Context for a run starting at `now`.
    pub fn new(settings: &Settings, now: DateTime<Utc>) -> Self {
        RunContext {
            window: DateRange::upcoming(now, settings.sync_days),
            dry_run: settings.dry_run,
            change_log: ChangeLog::new(settings.timezone),
            classifier: HolidayClassifier::new(settings.holiday_rules.clone()),
        }
    }
}
