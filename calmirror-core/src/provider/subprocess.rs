//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `calmirror-provider-google`) using JSON over stdin/stdout.
//! Any executable that speaks the protocol in [`super::protocol`] can be
//! a provider; it manages its own credentials. calmirror only passes the
//! provider-specific parameters from the `[remote]` config table.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::constants::PROVIDER_TIMEOUT_SECS;
use crate::date_range::DateRange;
use crate::error::{CalMirrorError, CalMirrorResult};
use crate::event::{CalendarInfo, Event};
use crate::provider::CalendarProvider;
use crate::provider::protocol::{
    Command, CreateEvent, DeleteEvent, ListEvents, ProviderCommand, Request, ResolveCalendar,
    Response,
};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(PROVIDER_TIMEOUT_SECS);

/// A client for a provider binary.
///
/// Each call spawns the binary, writes one request line and reads one
/// response line.
#[derive(Debug, Clone)]
pub struct SubprocessProvider {
    name: String,
    binary_path: PathBuf,
    remote_config: serde_json::Map<String, serde_json::Value>,
}

impl SubprocessProvider {
    /// Looks for an executable named `calmirror-provider-{name}` in PATH.
    pub fn from_name(
        name: &str,
        remote_config: serde_json::Map<String, serde_json::Value>,
    ) -> CalMirrorResult<Self> {
        let binary_name = format!("calmirror-provider-{}", name);
        let binary_path = which::which(&binary_name).map_err(|_| {
            CalMirrorError::ProviderNotInstalled(format!(
                "{} (expected an executable named {})",
                name, binary_name
            ))
        })?;

        Ok(Self::with_binary(name, binary_path, remote_config))
    }

    pub fn with_binary(
        name: &str,
        binary_path: impl AsRef<Path>,
        remote_config: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        SubprocessProvider {
            name: name.to_string(),
            binary_path: binary_path.as_ref().to_path_buf(),
            remote_config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> CalMirrorResult<C::Response> {
        timeout(PROVIDER_TIMEOUT, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| CalMirrorError::ProviderTimeout(PROVIDER_TIMEOUT.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> CalMirrorResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| CalMirrorError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| CalMirrorError::Serialization(e.to_string()))?;

        let mut child = TokioCommand::new(&self.binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CalMirrorError::Provider(format!(
                    "Failed to spawn {}: {}",
                    self.binary_path.display(),
                    e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CalMirrorError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(CalMirrorError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        let Some(line) = response_str.lines().find(|l| !l.trim().is_empty()) else {
            return Err(CalMirrorError::Provider(
                "Provider returned no response".into(),
            ));
        };

        let response: Response<R> = serde_json::from_str(line)
            .map_err(|e| CalMirrorError::Provider(format!("Failed to parse response: {}", e)))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } => Err(CalMirrorError::Provider(error)),
        }
    }
}

impl CalendarProvider for SubprocessProvider {
    async fn resolve_calendar(&self, calendar_id: &str) -> CalMirrorResult<Option<CalendarInfo>> {
        self.call(ResolveCalendar {
            remote_config: self.remote_config.clone(),
            calendar_id: calendar_id.to_string(),
        })
        .await
    }

    async fn list_events(&self, calendar_id: &str, range: &DateRange) -> CalMirrorResult<Vec<Event>> {
        self.call(ListEvents {
            remote_config: self.remote_config.clone(),
            calendar_id: calendar_id.to_string(),
            from: range.from_rfc3339(),
            to: range.to_rfc3339(),
        })
        .await
    }

    async fn create_event(&self, calendar_id: &str, event: &Event) -> CalMirrorResult<Event> {
        self.call(CreateEvent {
            remote_config: self.remote_config.clone(),
            calendar_id: calendar_id.to_string(),
            event: event.clone(),
        })
        .await
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> CalMirrorResult<()> {
        self.call(DeleteEvent {
            remote_config: self.remote_config.clone(),
            calendar_id: calendar_id.to_string(),
            event_id: event_id.to_string(),
        })
        .await
    }
}
