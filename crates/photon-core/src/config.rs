//! Client configuration shared by every Photon client.
//!
//! [`ClientOptions`] is plain data: it can be loaded from a file with serde and is
//! checked with `validator` before a client is built. Credentials are deliberately
//! absent; tokens are supplied at runtime through a
//! [`CredentialProvider`](crate::credentials::CredentialProvider).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::client::{
    PollPolicy, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TASK_POLL_INTERVAL_MS,
    DEFAULT_TASK_POLL_MAX_INTERVAL_MS, DEFAULT_TASK_POLL_TIMEOUT_MS,
};
use crate::error::Result;

/// Strip every trailing `/` from an endpoint.
#[must_use]
pub fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT
}

const fn default_task_poll_interval_ms() -> u64 {
    DEFAULT_TASK_POLL_INTERVAL_MS
}

const fn default_task_poll_max_interval_ms() -> u64 {
    DEFAULT_TASK_POLL_MAX_INTERVAL_MS
}

const fn default_task_poll_backoff_multiplier() -> u32 {
    1
}

const fn default_task_poll_timeout_ms() -> u64 {
    DEFAULT_TASK_POLL_TIMEOUT_MS
}

/// Options for constructing a Photon client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_poll_intervals"))]
pub struct ClientOptions {
    /// Base URL of the Photon API, e.g. `https://10.146.1.0:9000`
    #[validate(url)]
    pub endpoint: String,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub ignore_certificate: bool,

    /// Additional PEM root certificates to trust
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub root_ca_paths: Vec<PathBuf>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    #[validate(range(min = 1, max = 3600))]
    pub request_timeout_secs: u64,

    /// Delay between task polls in milliseconds
    #[serde(default = "default_task_poll_interval_ms")]
    #[validate(range(min = 1))]
    pub task_poll_interval_ms: u64,

    /// Cap on the delay between task polls in milliseconds
    #[serde(default = "default_task_poll_max_interval_ms")]
    #[validate(range(min = 1))]
    pub task_poll_max_interval_ms: u64,

    /// Growth factor applied to the poll delay after each poll
    #[serde(default = "default_task_poll_backoff_multiplier")]
    #[validate(range(min = 1, max = 10))]
    pub task_poll_backoff_multiplier: u32,

    /// Overall task wait bound in milliseconds; 0 waits indefinitely
    #[serde(default = "default_task_poll_timeout_ms")]
    pub task_poll_timeout_ms: u64,
}

fn validate_poll_intervals(options: &ClientOptions) -> std::result::Result<(), ValidationError> {
    if options.task_poll_max_interval_ms < options.task_poll_interval_ms {
        let mut error = ValidationError::new("poll_interval_range");
        error.message = Some("task_poll_max_interval_ms must be >= task_poll_interval_ms".into());
        return Err(error);
    }
    Ok(())
}

impl ClientOptions {
    /// Options for `endpoint` with default timeouts. The endpoint is normalised
    /// and validated.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let options = Self {
            endpoint: normalize_endpoint(&endpoint.into()),
            ignore_certificate: false,
            root_ca_paths: Vec::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT,
            task_poll_interval_ms: DEFAULT_TASK_POLL_INTERVAL_MS,
            task_poll_max_interval_ms: DEFAULT_TASK_POLL_MAX_INTERVAL_MS,
            task_poll_backoff_multiplier: 1,
            task_poll_timeout_ms: DEFAULT_TASK_POLL_TIMEOUT_MS,
        };
        options.validate()?;
        Ok(options)
    }

    /// Disable TLS certificate verification.
    #[must_use]
    pub fn with_ignore_certificate(mut self, ignore: bool) -> Self {
        self.ignore_certificate = ignore;
        self
    }

    /// Trust an additional PEM root certificate file.
    #[must_use]
    pub fn with_root_ca(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_ca_paths.push(path.into());
        self
    }

    /// Set the per-request timeout, rounded up to whole seconds.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = duration_to_millis(timeout).div_ceil(1000).max(1);
        self
    }

    /// Set the task poll interval.
    #[must_use]
    pub fn with_task_poll_interval(mut self, interval: Duration) -> Self {
        self.task_poll_interval_ms = duration_to_millis(interval).max(1);
        self
    }

    /// Set the cap on the task poll interval.
    #[must_use]
    pub fn with_task_poll_max_interval(mut self, interval: Duration) -> Self {
        self.task_poll_max_interval_ms = duration_to_millis(interval).max(1);
        self
    }

    /// Set the task poll backoff multiplier.
    #[must_use]
    pub fn with_task_poll_backoff_multiplier(mut self, multiplier: u32) -> Self {
        self.task_poll_backoff_multiplier = multiplier;
        self
    }

    /// Set the overall task wait bound. Zero waits indefinitely; any non-zero
    /// bound is kept to at least one millisecond.
    #[must_use]
    pub fn with_task_poll_timeout(mut self, timeout: Duration) -> Self {
        self.task_poll_timeout_ms = if timeout.is_zero() {
            0
        } else {
            duration_to_millis(timeout).max(1)
        };
        self
    }

    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Poll timing derived from these options.
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new()
            .with_interval(Duration::from_millis(self.task_poll_interval_ms))
            .with_max_interval(Duration::from_millis(self.task_poll_max_interval_ms))
            .with_backoff_multiplier(self.task_poll_backoff_multiplier)
            .with_timeout(Duration::from_millis(self.task_poll_timeout_ms))
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
