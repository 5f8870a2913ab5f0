//! Error types for calmirror.

use thiserror::Error;

/// Errors that can occur in calmirror operations.
#[derive(Error, Debug)]
pub enum CalMirrorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Delivery to {channel} failed: {reason}")]
    Delivery { channel: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for calmirror operations.
pub type CalMirrorResult<T> = Result<T, CalMirrorError>;
