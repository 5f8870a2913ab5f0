//! calmirror configuration.
//!
//! Settings are layered: built-in defaults, then the TOML file at
//! `~/.config/calmirror/config.toml` (or an explicit path), then
//! `CALMIRROR_*` environment variables. List settings accept either a
//! TOML array or a comma-separated string.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono_tz::Tz;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HOLIDAY_CALENDAR_ID, DEFAULT_PROVIDER, DEFAULT_SYNC_DAYS, DEFAULT_TIMEZONE,
    MAX_SYNC_DAYS,
};
use crate::error::{CalMirrorError, CalMirrorResult};
use crate::holiday::{HolidayRules, weekday_from_sunday};
use crate::notify::{Channel, ChannelKind};
use crate::policy::{KeywordMatcher, SyncPolicy, TitleMode};
use crate::reconcile::Direction;

const ENV_PREFIX: &str = "CALMIRROR";

/// A list given either as an array or as a comma-separated string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListSetting<T> {
    List(Vec<T>),
    Csv(String),
}

impl<T: FromStr> ListSetting<T> {
    /// Items are trimmed and empty ones dropped.
    pub fn into_values(self, key: &str) -> CalMirrorResult<Vec<T>> {
        match self {
            ListSetting::List(values) => Ok(values),
            ListSetting::Csv(s) => s
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| {
                    item.parse().map_err(|_| {
                        CalMirrorError::Config(format!("Invalid value '{}' in {}", item, key))
                    })
                })
                .collect(),
        }
    }
}

fn csv<T>(s: &str) -> ListSetting<T> {
    ListSetting::Csv(s.to_string())
}

fn default_sync_days() -> i64 {
    DEFAULT_SYNC_DAYS
}
fn default_weekend_days() -> ListSetting<u8> {
    ListSetting::List(vec![0, 6])
}
fn default_keywords_to_life() -> ListSetting<String> {
    csv("[Life],出張,深夜作業")
}
fn default_keywords_to_work() -> ListSetting<String> {
    csv("[Work],通院,役所")
}
fn default_mask_title_work() -> String {
    "仕事".to_string()
}
fn default_mask_title_life() -> String {
    "休暇".to_string()
}
fn default_true() -> bool {
    true
}
fn default_holiday_ignore_list() -> ListSetting<String> {
    csv("節分,バレンタイン,雛祭り,母の日,父の日,七夕,ハロウィン,クリスマス")
}
fn default_custom_holiday_keywords() -> ListSetting<String> {
    ListSetting::List(Vec::new())
}
fn default_holiday_calendar_id() -> String {
    DEFAULT_HOLIDAY_CALENDAR_ID.to_string()
}
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}
fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

/// Provider-specific parameters, passed through to the provider untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// Settings as read from the config sources, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSettings {
    #[serde(default)]
    pub work_calendar_id: Option<String>,
    #[serde(default)]
    pub life_calendar_id: Option<String>,

    #[serde(default)]
    pub discord_webhook_url: Option<String>,
    #[serde(default)]
    pub google_chat_webhook_url: Option<String>,

    #[serde(default = "default_keywords_to_life")]
    pub sync_keywords_to_life: ListSetting<String>,
    #[serde(default = "default_keywords_to_work")]
    pub sync_keywords_to_work: ListSetting<String>,

    #[serde(default = "default_mask_title_work")]
    pub mask_title_work: String,
    #[serde(default = "default_mask_title_life")]
    pub mask_title_life: String,
    #[serde(default)]
    pub mask_work_to_life: bool,
    #[serde(default = "default_true")]
    pub mask_life_to_work: bool,

    #[serde(default = "default_sync_days")]
    pub sync_days: i64,
    #[serde(default = "default_weekend_days")]
    pub weekend_days: ListSetting<u8>,
    #[serde(default = "default_holiday_ignore_list")]
    pub holiday_ignore_list: ListSetting<String>,
    #[serde(default = "default_custom_holiday_keywords")]
    pub custom_holiday_keywords: ListSetting<String>,
    #[serde(default = "default_holiday_calendar_id")]
    pub holiday_calendar_id: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl RawSettings {
    /// `~/.config/calmirror/config.toml`
    pub fn config_path() -> CalMirrorResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalMirrorError::Config("Could not determine config directory".into()))?
            .join("calmirror");

        Ok(config_dir.join("config.toml"))
    }

    /// Resolve an explicit path (with `~` expanded) or fall back to the default.
    pub fn resolve_path(path: Option<&Path>) -> CalMirrorResult<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(
                shellexpand::tilde(&p.to_string_lossy()).into_owned(),
            )),
            None => Self::config_path(),
        }
    }

    /// Load from the config file (optional) and the environment.
    pub fn load(path: Option<&Path>) -> CalMirrorResult<Self> {
        let path = Self::resolve_path(path)?;
        Self::load_from(&path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(path: &Path, env: Environment) -> CalMirrorResult<Self> {
        Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(false))
            .add_source(env)
            .build()
            .map_err(|e| CalMirrorError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalMirrorError::Config(e.to_string()))
    }

    /// Write a config template with every option commented out.
    /// Returns false if a file already exists at `path`.
    pub fn create_default_config(path: &Path) -> CalMirrorResult<bool> {
        if path.exists() {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalMirrorError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, default_config_template())
            .map_err(|e| CalMirrorError::Config(format!("Could not write config file: {e}")))?;

        Ok(true)
    }
}

fn default_config_template() -> String {
    format!(
        "\
# calmirror configuration
# Every key can also be set as an environment variable, e.g. CALMIRROR_DRY_RUN=true

# Required: the two calendars to keep in sync
work_calendar_id = \"\"
life_calendar_id = \"\"

# Notification webhooks (optional)
# discord_webhook_url = \"https://discord.com/api/webhooks/...\"
# google_chat_webhook_url = \"https://chat.googleapis.com/v1/spaces/...\"

# Titles containing any of these are always synced
# sync_keywords_to_life = [\"[Life]\", \"出張\", \"深夜作業\"]
# sync_keywords_to_work = [\"[Work]\", \"通院\", \"役所\"]

# Title masking
# mask_work_to_life = false
# mask_life_to_work = true
# mask_title_work = \"仕事\"
# mask_title_life = \"休暇\"

# Days ahead of now to sync
# sync_days = {sync_days}

# Sunday = 0 ... Saturday = 6
# weekend_days = [0, 6]

# Holiday feed and observances on it that are working days
# holiday_calendar_id = \"{holiday_calendar_id}\"
# holiday_ignore_list = [\"節分\", \"バレンタイン\", \"雛祭り\", \"母の日\", \"父の日\", \"七夕\", \"ハロウィン\", \"クリスマス\"]

# All-day work calendar events containing these count as holidays
# custom_holiday_keywords = []

# timezone = \"{timezone}\"
# dry_run = false

# Provider binary (calmirror-provider-<name>) and its parameters
# provider = \"{provider}\"
# [remote]
# google_account = \"you@example.com\"
",
        sync_days = DEFAULT_SYNC_DAYS,
        holiday_calendar_id = DEFAULT_HOLIDAY_CALENDAR_ID,
        timezone = DEFAULT_TIMEZONE,
        provider = DEFAULT_PROVIDER,
    )
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub work_calendar_id: String,
    pub life_calendar_id: String,
    pub channels: Vec<Channel>,
    pub sync_days: i64,
    pub dry_run: bool,
    pub timezone: Tz,
    pub provider: String,
    pub remote: RemoteConfig,
    pub holiday_rules: HolidayRules,
    pub work_to_life: SyncPolicy,
    pub life_to_work: SyncPolicy,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> CalMirrorResult<Self> {
        Self::try_from(RawSettings::load(path)?)
    }

    /// The two passes of a run, in order.
    pub fn directions(&self) -> [Direction; 2] {
        [
            Direction {
                name: "Work → Life".to_string(),
                source_calendar_id: self.work_calendar_id.clone(),
                target_calendar_id: self.life_calendar_id.clone(),
                policy: self.work_to_life.clone(),
            },
            Direction {
                name: "Life → Work".to_string(),
                source_calendar_id: self.life_calendar_id.clone(),
                target_calendar_id: self.work_calendar_id.clone(),
                policy: self.life_to_work.clone(),
            },
        ]
    }
}

fn required(value: Option<String>, key: &str) -> CalMirrorResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CalMirrorError::Config(format!("{} must be set", key)))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn title_mode(masked: bool, placeholder: String) -> TitleMode {
    if masked {
        TitleMode::Masked(placeholder)
    } else {
        TitleMode::Verbatim
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = CalMirrorError;

    fn try_from(raw: RawSettings) -> CalMirrorResult<Self> {
        let work_calendar_id = required(raw.work_calendar_id, "work_calendar_id")?;
        let life_calendar_id = required(raw.life_calendar_id, "life_calendar_id")?;
        if work_calendar_id == life_calendar_id {
            return Err(CalMirrorError::Config(
                "work_calendar_id and life_calendar_id must differ".into(),
            ));
        }

        if !(1..=MAX_SYNC_DAYS).contains(&raw.sync_days) {
            return Err(CalMirrorError::Config(format!(
                "sync_days must be between 1 and {}, got {}",
                MAX_SYNC_DAYS, raw.sync_days
            )));
        }

        let timezone: Tz = raw
            .timezone
            .parse()
            .map_err(|_| CalMirrorError::Config(format!("Unknown timezone '{}'", raw.timezone)))?;

        let weekend_days = raw
            .weekend_days
            .into_values("weekend_days")?
            .into_iter()
            .map(|n| {
                weekday_from_sunday(n).ok_or_else(|| {
                    CalMirrorError::Config(format!("weekend_days must be 0-6, got {}", n))
                })
            })
            .collect::<CalMirrorResult<Vec<_>>>()?;

        let mut channels = Vec::new();
        if let Some(url) = optional(raw.discord_webhook_url) {
            channels.push(Channel::new(ChannelKind::Discord, url));
        }
        if let Some(url) = optional(raw.google_chat_webhook_url) {
            channels.push(Channel::new(ChannelKind::GoogleChat, url));
        }

        let holiday_rules = HolidayRules {
            weekend_days,
            holiday_calendar_id: raw.holiday_calendar_id,
            ignore_words: KeywordMatcher::new(raw.holiday_ignore_list.into_values("holiday_ignore_list")?),
            custom_keywords: KeywordMatcher::new(
                raw.custom_holiday_keywords.into_values("custom_holiday_keywords")?,
            ),
            work_calendar_id: Some(work_calendar_id.clone()),
            timezone,
        };

        // Work events reach the life calendar on days off; life events reach
        // the work calendar on working days.
        let work_to_life = SyncPolicy::new(
            KeywordMatcher::new(raw.sync_keywords_to_life.into_values("sync_keywords_to_life")?),
            title_mode(raw.mask_work_to_life, raw.mask_title_work),
            true,
            false,
        )?;
        let life_to_work = SyncPolicy::new(
            KeywordMatcher::new(raw.sync_keywords_to_work.into_values("sync_keywords_to_work")?),
            title_mode(raw.mask_life_to_work, raw.mask_title_life),
            false,
            true,
        )?;

        Ok(Settings {
            work_calendar_id,
            life_calendar_id,
            channels,
            sync_days: raw.sync_days,
            dry_run: raw.dry_run,
            timezone,
            provider: raw.provider,
            remote: raw.remote,
            holiday_rules,
            work_to_life,
            life_to_work,
        })
    }
}
