//! Unified error handling for the client.

use crate::config::ConfigError;
use serde_json::Value;

/// HTTP status the API answers with when a customer already exists.
pub const CONFLICT: u16 = 409;

/// A non-2xx answer from the API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("remote error {status}: {message}")]
pub struct RemoteError {
    /// HTTP status code
    pub status: u16,
    /// The body's `message`, or a generic description
    pub message: String,
    /// Parsed response body, if any
    pub body: Option<Value>,
}

impl RemoteError {
    /// Build from a status and the parsed response body.
    pub fn new(status: u16, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP status {}", status));
        Self {
            status,
            message,
            body,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status == CONFLICT
    }
}

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Engine error: {0}")]
    Engine(#[from] contacthub_engine::Error),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Whether this is a 409 answer from the API.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Remote(e) if e.is_conflict())
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_comes_from_body() {
        let err = RemoteError::new(401, Some(json!({"message": "Message", "logref": "x"})));
        assert_eq!(err.message, "Message");
        assert_eq!(err.to_string(), "remote error 401: Message");
        assert!(!err.is_conflict());
    }

    #[test]
    fn generic_message_without_body() {
        let err = RemoteError::new(500, None);
        assert_eq!(err.message, "HTTP status 500");
    }

    #[test]
    fn conflict_detection() {
        let err = ClientError::from(RemoteError::new(409, Some(json!({"message": "exists"}))));
        assert!(err.is_conflict());
        assert!(!ClientError::Transport("timeout".into()).is_conflict());
    }
}
