//! Health report types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::dependency::CallError;

/// Composite verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Warning,
    Error,
}

/// Local store reachability as reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreState {
    Connected,
    Disconnected,
}

/// Remote dependency outcome, present only on dependency probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemoteState {
    Success,
    HttpError { code: u16 },
    TransportError { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub service_name: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_store: Option<StoreState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_latency: Option<Duration>,
}

/// Successful dependency probe.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyReport {
    pub report: HealthReport,
    /// Configured base URL of the dependency.
    pub url: String,
    /// Decoded body returned by the dependency.
    pub data: serde_json::Value,
    pub latency: Duration,
    pub attempts: u32,
}

/// Why a dependency probe ended in failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The dependency answered, but with a failure status.
    HttpStatus { code: u16 },
    /// The dependency could not be reached or its answer was unusable.
    Transport { message: String },
    /// Something went wrong locally before a call could be made.
    Internal { message: String },
}

impl From<CallError> for FailureKind {
    fn from(error: CallError) -> Self {
        match error.http_status() {
            Some(code) => FailureKind::HttpStatus { code },
            None => FailureKind::Transport { message: error.to_string() },
        }
    }
}

/// Error envelope for a failed dependency probe.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyFailure {
    pub report: HealthReport,
    /// Configured base URL of the dependency.
    pub url: String,
    pub kind: FailureKind,
    /// Attempts made; zero when the call never started.
    pub attempts: u32,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::HttpStatus { code } => write!(f, "dependency responded with HTTP {}", code),
            FailureKind::Transport { message } => write!(f, "{}", message),
            FailureKind::Internal { message } => write!(f, "internal error: {}", message),
        }
    }
}

impl From<&FailureKind> for RemoteState {
    fn from(kind: &FailureKind) -> Self {
        match kind {
            FailureKind::HttpStatus { code } => RemoteState::HttpError { code: *code },
            other => RemoteState::TransportError { message: other.to_string() },
        }
    }
}
