/// Days ahead of now covered by a sync pass.
pub const DEFAULT_SYNC_DAYS: i64 = 30;

/// Upper bound on `sync_days`.
pub const MAX_SYNC_DAYS: i64 = 3650;

/// Google's public holiday feed for Japan.
pub const DEFAULT_HOLIDAY_CALENDAR_ID: &str = "ja.japanese#holiday@group.v.calendar.google.com";

pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";

pub const DEFAULT_PROVIDER: &str = "google";

/// Timeout applied to every provider subprocess call.
pub const PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Timeout applied to every webhook request.
pub const WEBHOOK_TIMEOUT_SECS: u64 = 10;
