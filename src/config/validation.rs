//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts > 0, timeouts > 0, addresses parse)
//! - Check the inbound request timeout can cover a full retry sequence
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::resilience::retries::RetryPolicy;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("dependency.base_url '{url}' is invalid: {reason}")]
    DependencyUrl { url: String, reason: String },

    #[error("retries.{0} must be greater than zero")]
    ZeroRetrySetting(&'static str),

    #[error("database.probe_timeout_secs must be greater than zero")]
    ZeroProbeTimeout,

    #[error("retries settings overflow the worst-case latency of a retry sequence")]
    RetryBudgetOverflow,

    #[error("timeouts.request_secs ({request_secs}s) is shorter than the worst-case dependency call ({worst_case_ms}ms)")]
    RequestTimeoutTooShort { request_secs: u64, worst_case_ms: u128 },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    match url::Url::parse(&config.dependency.data_url()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::DependencyUrl {
            url: config.dependency.base_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::DependencyUrl {
            url: config.dependency.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroRetrySetting("max_attempts"));
    }
    if config.retries.attempt_timeout_ms == 0 {
        errors.push(ValidationError::ZeroRetrySetting("attempt_timeout_ms"));
    }
    if config.database.probe_timeout_secs == 0 {
        errors.push(ValidationError::ZeroProbeTimeout);
    }

    match RetryPolicy::from(&config.retries).worst_case_latency() {
        None => errors.push(ValidationError::RetryBudgetOverflow),
        Some(worst_case) if Duration::from_secs(config.timeouts.request_secs) < worst_case => {
            errors.push(ValidationError::RequestTimeoutTooShort {
                request_secs: config.timeouts.request_secs,
                worst_case_ms: worst_case.as_millis(),
            });
        }
        Some(_) => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
