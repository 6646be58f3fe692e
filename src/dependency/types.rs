//! Outcome types for calls to the remote data service.

use std::time::Duration;
use thiserror::Error;

/// Why a single dependency call failed.
///
/// Classification only; nothing here decides whether to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The peer did not answer within the attempt deadline.
    #[error("request timed out after {after:?}")]
    Timeout { after: Duration },

    /// Connection refused, reset, DNS failure, and similar.
    #[error("transport error: {0}")]
    Transport(String),

    /// The peer answered 2xx but the body was not valid JSON.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The peer answered with a non-2xx status.
    #[error("dependency responded with HTTP {code}")]
    HttpStatus { code: u16 },
}

impl CallError {
    /// Status code when the peer responded with a failure status.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            CallError::HttpStatus { code } => Some(*code),
            _ => None,
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CallError::Timeout { .. } => "timeout",
            CallError::Transport(_) => "transport",
            CallError::Decode(_) => "decode",
            CallError::HttpStatus { .. } => "http_status",
        }
    }
}

/// A successful response from the dependency.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyResponse {
    pub status: u16,
    pub body: serde_json::Value,
    pub latency: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CallError::Timeout { after: Duration::from_secs(10) };
        assert_eq!(err.to_string(), "request timed out after 10s");

        let err = CallError::HttpStatus { code: 503 };
        assert_eq!(err.to_string(), "dependency responded with HTTP 503");
        assert_eq!(err.http_status(), Some(503));
        assert_eq!(CallError::Transport("refused".into()).http_status(), None);
    }
}
