//! Posts the run's change summary to chat webhooks.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, error, info};

use crate::changelog::ChangeLog;
use crate::constants::WEBHOOK_TIMEOUT_SECS;
use crate::error::{CalMirrorError, CalMirrorResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Discord,
    GoogleChat,
}

impl ChannelKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChannelKind::Discord => "Discord",
            ChannelKind::GoogleChat => "Google Chat",
        }
    }

    /// Webhook body for a report made of `lines`.
    pub fn payload(&self, lines: &[String]) -> Value {
        let body = lines.join("\n");
        match self {
            ChannelKind::Discord => json!({
                "content": format!("📅 **Calendar Sync Report**\n{}", body)
            }),
            ChannelKind::GoogleChat => json!({
                "text": format!("📅 *Calendar Sync Report*\n{}", body)
            }),
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub kind: ChannelKind,
    pub url: String,
}

impl Channel {
    pub fn new(kind: ChannelKind, url: impl Into<String>) -> Self {
        Channel {
            kind,
            url: url.into(),
        }
    }
}

/// What happened to a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOutcome {
    pub delivered: usize,
    pub failed: usize,
    /// Nothing was sent: no changes, dry-run, or no channels configured.
    pub skipped: bool,
}

pub struct Reporter {
    client: Client,
    channels: Vec<Channel>,
}

impl Reporter {
    pub fn new(channels: Vec<Channel>) -> CalMirrorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
            .build()
            .map_err(|e| CalMirrorError::Config(format!("Could not build HTTP client: {e}")))?;

        Ok(Reporter { client, channels })
    }

    /// Send the log's lines to every channel.
    ///
    /// A channel that fails is logged and does not stop the others.
    pub async fn report(&self, log: &ChangeLog, dry_run: bool) -> ReportOutcome {
        let skipped = ReportOutcome {
            skipped: true,
            ..Default::default()
        };

        if log.is_empty() {
            info!("No changes; nothing to report");
            return skipped;
        }
        if dry_run {
            info!("[DRY_RUN] Not sending notifications ({} changes)", log.len());
            return skipped;
        }
        if self.channels.is_empty() {
            debug!("No notification channels configured");
            return skipped;
        }

        let lines = log.lines();
        let mut outcome = ReportOutcome::default();

        for channel in &self.channels {
            match self.deliver(channel, &lines).await {
                Ok(()) => {
                    info!("Sent report to {}", channel.kind);
                    outcome.delivered += 1;
                }
                Err(e) => {
                    error!("{}", e);
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }

    async fn deliver(&self, channel: &Channel, lines: &[String]) -> CalMirrorResult<()> {
        let failed = |reason: String| CalMirrorError::Delivery {
            channel: channel.kind.name().to_string(),
            reason,
        };

        let resp = self
            .client
            .post(&channel.url)
            .json(&channel.kind.payload(lines))
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let text = resp.text().await.unwrap_or_default();
        Err(failed(format!("HTTP {status}: {text}")))
    }
}
