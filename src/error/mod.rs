//! Error types for goose-stream.
//!
//! Protocol-level problems (server-reported errors, malformed tool calls) are
//! not errors in this sense: the parser surfaces them as
//! [`StreamPart::Error`](crate::protocol::StreamPart::Error) values. `ChatError`
//! covers configuration, transport and I/O failures around the parser.

use thiserror::Error;

/// Primary error type for all goose-stream operations.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// The backend reported an error inside an otherwise successful stream.
    #[error("Stream error: {0}")]
    Stream(String),
}

impl From<toml::de::Error> for ChatError {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration(format!("invalid config file: {error}"))
    }
}

impl ChatError {
    /// Create an API error from a status code and response body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this error is potentially retryable.
    ///
    /// Only transport-level failures qualify; a half-consumed stream is never
    /// resumed, so callers retry by issuing the request again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_connect() || e.is_timeout(),
            Self::Timeout(_) => true,
            Self::Api { status, .. } => matches!(status, 429 | 500..=599),
            _ => false,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ChatError>;
