//! Defines the JSON protocol used for communication between calmirror
//! and provider binaries over stdin/stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::{CalendarInfo, Event};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ResolveCalendar,
    ListEvents,
    CreateEvent,
    DeleteEvent,
}

/// Request sent from calmirror to provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from provider to calmirror.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> serde_json::Result<String> {
        serde_json::to_string(&Response::Success { data })
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> serde_json::Result<String> {
        serde_json::to_string(&Response::<()>::Error {
            error: msg.to_string(),
        })
    }
}

/// Resolve a calendar by id. Providers answer `null` for unknown ids.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveCalendar {
    /// Provider-specific config (e.g., google_account)
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub calendar_id: String,
}

impl ProviderCommand for ResolveCalendar {
    type Response = Option<CalendarInfo>;
    fn command() -> Command {
        Command::ResolveCalendar
    }
}

/// List events within a time range.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub calendar_id: String,
    pub from: String,
    pub to: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<Event>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// Create a new event, tags included.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub calendar_id: String,
    pub event: Event,
}

impl ProviderCommand for CreateEvent {
    type Response = Event;
    fn command() -> Command {
        Command::CreateEvent
    }
}

/// Delete an event by ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub calendar_id: String,
    pub event_id: String,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_flattens_remote_config() {
        let mut remote_config = serde_json::Map::new();
        remote_config.insert("google_account".into(), "me@example.com".into());

        let cmd = DeleteEvent {
            remote_config,
            calendar_id: "work".into(),
            event_id: "evt-1".into(),
        };
        let request = Request {
            command: DeleteEvent::command(),
            params: serde_json::to_value(cmd).unwrap(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["command"], "delete_event");
        assert_eq!(json["params"]["google_account"], "me@example.com");
        assert_eq!(json["params"]["event_id"], "evt-1");
    }

    #[test]
    fn test_error_response_parses() {
        let line = Response::error("calendar is read-only").unwrap();
        let response: Response<()> = serde_json::from_str(&line).unwrap();

        match response {
            Response::Error { error } => assert_eq!(error, "calendar is read-only"),
            Response::Success { .. } => panic!("expected error response"),
        }
    }

    #[test]
    fn test_unknown_calendar_resolves_to_none() {
        let line = Response::success(None::<CalendarInfo>).unwrap();
        let response: Response<Option<CalendarInfo>> = serde_json::from_str(&line).unwrap();

        assert!(matches!(response, Response::Success { data: None }));
    }
}
