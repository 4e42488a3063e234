//! Error types shared by the data pipeline, the API client and the CLI.
//!
//! Library code returns these typed errors; the binary maps them onto
//! process exit codes and JSON error messages.

use std::fmt;
use thiserror::Error;

/// Exit code for a successful command.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for a command that reached the API (or the parser) and failed.
pub const EXIT_ERROR: i32 = 1;
/// Exit code when logging in to the API failed.
pub const EXIT_AUTHENTICATION_ERROR: i32 = 2;
/// Exit code for missing or malformed command-line flags.
pub const EXIT_FLAG_ERROR: i32 = 3;

/// A single series whose serialized form does not fit the upload budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OversizedEntry {
    pub limit: usize,
    pub size: usize,
    pub subject_id: String,
    pub metric_id: i64,
}

impl fmt::Display for OversizedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Metric data too big, upload size: {}, entry size: {}, subject id: {}, metric id: {}",
            self.limit, self.size, self.subject_id, self.metric_id
        )
    }
}

/// Errors raised while parsing, batching or encoding data points.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Bad datapoint format at offset {offset}: {reason}")]
    MalformedInput { offset: usize, reason: String },

    #[error("Failed to parse dimension specs format: {0}")]
    InvalidDimensionSpecs(String),

    #[error("{0}")]
    EntryTooLarge(OversizedEntry),

    #[error("Failed to encode data payload: {0}")]
    Encoding(#[from] std::io::Error),
}

impl DataError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        DataError::MalformedInput {
            offset,
            reason: reason.into(),
        }
    }
}

/// Errors returned by the CoScale API client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Instance not found: {0}")]
    NotFound(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Duplicate with id {0}")]
    Duplicate(i64),

    #[error("{0}")]
    Disabled(String),

    #[error("{0}")]
    InvalidConfig(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Received bad status code: {code} -- {body}")]
    Status { code: u16, body: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode API response: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl ApiError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::Authentication(_))
    }

    /// Returns the id of the existing object if the API reported a duplicate.
    pub fn duplicate_id(&self) -> Option<i64> {
        match self {
            ApiError::Duplicate(id) => Some(*id),
            _ => None,
        }
    }
}

/// Errors raised while locating, reading or writing the API configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration file found (looked in: {0})")]
    NotFound(String),

    #[error("Failed to access configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse configuration from {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Renders an error the way the CLI prints it: an embedded JSON body from
/// the API is passed through, anything else is wrapped in `{"msg": ...}`.
pub fn error_json(message: &str) -> String {
    if let Some(index) = message.find('{') {
        let body = &message[index..];
        if serde_json::from_str::<serde_json::Value>(body).is_ok() {
            return body.to_string();
        }
    }
    serde_json::json!({ "msg": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_json_wraps_plain_message() {
        assert_eq!(error_json("Not Found"), r#"{"msg":"Not Found"}"#);
    }

    #[test]
    fn test_error_json_extracts_api_body() {
        let err = ApiError::Request(r#"{"msg":"bad name"}"#.to_string());
        assert_eq!(error_json(&err.to_string()), r#"{"msg":"bad name"}"#);
    }

    #[test]
    fn test_error_json_ignores_braces_in_plain_text() {
        let msg = "Bad datapoint format at offset 9: expected a number, found '{'";
        let rendered = error_json(msg);
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["msg"], msg);
    }

    #[test]
    fn test_duplicate_id() {
        assert_eq!(ApiError::Duplicate(42).duplicate_id(), Some(42));
        assert_eq!(ApiError::NotFound("x".into()).duplicate_id(), None);
    }

    #[test]
    fn test_oversized_entry_message() {
        let entry = OversizedEntry {
            limit: 800,
            size: 1200,
            subject_id: "S1".into(),
            metric_id: 7,
        };
        let msg = DataError::EntryTooLarge(entry).to_string();
        assert!(msg.contains("upload size: 800"));
        assert!(msg.contains("subject id: S1"));
    }
}
