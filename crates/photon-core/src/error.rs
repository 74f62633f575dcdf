//! Error types for Photon operations.
//!
//! Every fallible call in the workspace returns [`Error`]. Failures reported by
//! the remote service are normalised into [`ApiError`] by [`translate_error`],
//! whether or not the response body matched the structured error schema.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::task::TaskError;

/// Code assigned to an [`ApiError`] built from a body that was not a structured error.
pub const MALFORMED_BODY_CODE: &str = "MalformedErrorBody";

/// Main error type for Photon operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// No response was received (connection refused, TLS failure, request timeout)
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// The service answered with a non-2xx status
    #[error("{0}")]
    Api(ApiError),

    /// A 2xx response whose body did not match the expected schema
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Polling gave up before the task reached a terminal state
    #[error(
        "Timed out after {timeout:?} waiting for task '{task_id}'; the task may still be running"
    )]
    PollTimeout {
        /// Task that was being watched
        task_id: String,
        /// Configured poll timeout
        timeout: Duration,
    },

    /// The task reached a terminal failure state
    #[error("{0}")]
    TaskFailed(Box<TaskError>),

    /// The caller cancelled the operation
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Specialized result type for Photon operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error reported by the Photon service.
///
/// Built either from a structured `{code, message, httpStatusCode?, data?}` body or,
/// when that body cannot be parsed, from the raw status line and body. The latter
/// case is identified by [`ApiError::is_malformed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Symbolic error code defined by the service
    pub code: String,
    /// Human-readable error message
    #[serde(default)]
    pub message: String,
    /// HTTP status code of the response
    #[serde(default)]
    pub http_status_code: u16,
    /// Service-specific error details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, serde_json::Value>>,
    /// Raw response body, present only when the body was not a structured error
    #[serde(skip)]
    pub raw_body: Option<String>,
}

impl ApiError {
    /// Create a structured error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>, http_status_code: u16) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            http_status_code,
            data: None,
            raw_body: None,
        }
    }

    /// Create the fallback error for a body that could not be parsed.
    ///
    /// The message has the form `Status: <status>, Body: <body> [<parse error>]`.
    #[must_use]
    pub fn malformed(status: StatusCode, body: &str, parse_error: impl fmt::Display) -> Self {
        Self {
            code: MALFORMED_BODY_CODE.to_string(),
            message: format!("Status: {status}, Body: {body} [{parse_error}]"),
            http_status_code: status.as_u16(),
            data: None,
            raw_body: Some(body.to_string()),
        }
    }

    /// Returns true if the response body did not match the structured error schema.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        self.raw_body.is_some()
    }

    /// Returns the HTTP status of the response, if it is a valid status code.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.http_status_code).ok()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_malformed() {
            return f.write_str(&self.message);
        }
        write!(
            f,
            "photon: {{ HTTP status: '{}', code: '{}', message: '{}'",
            self.http_status_code, self.code, self.message
        )?;
        if let Some(data) = &self.data {
            let data = serde_json::to_string(data).unwrap_or_default();
            write!(f, ", data: '{data}'")?;
        }
        f.write_str(" }")
    }
}

impl std::error::Error for ApiError {}

/// Translate a non-2xx response into an [`ApiError`].
///
/// Never fails: a body that is not a structured error yields the
/// [`ApiError::malformed`] fallback carrying the status line and raw body.
#[must_use]
pub fn translate_error(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<ApiError>(body) {
        Ok(mut error) => {
            if error.http_status_code == 0 {
                error.http_status_code = status.as_u16();
            }
            error
        }
        Err(err) => ApiError::malformed(status, body, err),
    }
}

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TransportUnavailable(_) => "TRANSPORT_UNAVAILABLE",
            Self::Api(_) => "API_ERROR",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::PollTimeout { .. } => "POLL_TIMEOUT",
            Self::TaskFailed(_) => "TASK_FAILED",
            Self::Cancelled(_) => "CANCELLED",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }

    /// Returns the service error, if this is an [`Error::Api`].
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the task failure, if this is an [`Error::TaskFailed`].
    #[must_use]
    pub fn task_error(&self) -> Option<&TaskError> {
        match self {
            Self::TaskFailed(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

impl From<TaskError> for Error {
    fn from(err: TaskError) -> Self {
        Self::TaskFailed(Box::new(err))
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::TransportUnavailable(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}
