// src/error.rs
// Standardized error types for devbridge

use std::time::Duration;
use thiserror::Error;

/// Main error type for the devbridge library
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("pattern error: {0}")]
    Regex(#[from] regex::Error),

    #[error("failed to spawn `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("`{command}` timed out after {}", humanize(.timeout))]
    Timeout { command: String, timeout: Duration },

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("unknown error: {0}")]
    Other(String),
}

/// Convenience type alias for Result using BridgeError
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Convert to user-facing string for MCP tool boundaries
    pub fn to_user_string(&self) -> String {
        self.to_string()
    }
}

/// Whole seconds as `300s`, anything finer as `500ms`
fn humanize(timeout: &Duration) -> String {
    if timeout.subsec_nanos() == 0 {
        format!("{}s", timeout.as_secs())
    } else {
        format!("{}ms", timeout.as_millis())
    }
}

impl From<String> for BridgeError {
    fn from(s: String) -> Self {
        BridgeError::Other(s)
    }
}

impl From<BridgeError> for String {
    fn from(err: BridgeError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_error() {
        let err = BridgeError::InvalidInput("bad key".to_string());
        assert!(err.to_string().contains("invalid input"));
        assert!(err.to_string().contains("bad key"));
    }

    #[test]
    fn test_timeout_error() {
        let err = BridgeError::Timeout {
            command: "make dev-up".to_string(),
            timeout: Duration::from_secs(300),
        };
        assert_eq!(err.to_string(), "`make dev-up` timed out after 300s");
    }

    #[test]
    fn test_sub_second_timeout_keeps_precision() {
        let err = BridgeError::Timeout {
            command: "make test".to_string(),
            timeout: Duration::from_millis(500),
        };
        assert_eq!(err.to_string(), "`make test` timed out after 500ms");
    }

    #[test]
    fn test_spawn_error() {
        let err = BridgeError::Spawn {
            command: "make test".to_string(),
            message: "No such file or directory".to_string(),
        };
        assert!(err.to_string().contains("failed to spawn"));
    }

    #[test]
    fn test_unknown_tool_error() {
        let err = BridgeError::UnknownTool("frobnicate".to_string());
        assert_eq!(err.to_user_string(), "unknown tool: frobnicate");
    }

    #[test]
    fn test_from_string() {
        let err: BridgeError = "something odd".to_string().into();
        assert!(matches!(err, BridgeError::Other(_)));
    }

    #[test]
    fn test_into_string() {
        let err = BridgeError::Config("missing key".to_string());
        let s: String = err.into();
        assert!(s.contains("configuration error"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<i32>("not json").unwrap_err();
        let err: BridgeError = json_err.into();
        assert!(matches!(err, BridgeError::Json(_)));
    }
}
