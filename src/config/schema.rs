//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::resilience::retries::RetryPolicy;

/// Root configuration for the user API.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Identity reported by health endpoints.
    pub service: ServiceInfo,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Local SQLite store.
    pub database: DatabaseConfig,

    /// Remote data service the API depends on.
    pub dependency: DependencyConfig,

    /// Retry policy for dependency calls.
    pub retries: RetryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Service identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            name: "user-api".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Local store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,

    /// Upper bound on a single reachability probe, in seconds.
    pub probe_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/users.sqlite"),
            probe_timeout_secs: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Remote dependency configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DependencyConfig {
    /// Base URL of the data service (overridable with `NODE_SERVICE_URL`).
    pub base_url: String,

    /// Path probed by `GET /external`.
    pub data_path: String,

    /// User-Agent sent on outbound calls.
    pub user_agent: String,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://node-service:3001".to_string(),
            data_path: "/data".to_string(),
            user_agent: concat!("user-api/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl DependencyConfig {
    /// Full URL of the probed endpoint.
    pub fn data_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.data_path.trim_start_matches('/')
        )
    }
}

/// Retry configuration.
///
/// Delay is constant between attempts; there is no backoff growth.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds.
    pub delay_ms: u64,

    /// Timeout applied to each individual attempt, in milliseconds.
    pub attempt_timeout_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
            attempt_timeout_ms: 10_000,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy::new(
            config.max_attempts,
            Duration::from_millis(config.delay_ms),
            Duration::from_millis(config.attempt_timeout_ms),
        )
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dependency_probe_policy() {
        let config = ServiceConfig::default();
        let policy = RetryPolicy::from(&config.retries);
        assert_eq!(policy, RetryPolicy::dependency_probe());
        assert_eq!(config.dependency.data_url(), "http://node-service:3001/data");
    }

    #[test]
    fn test_data_url_joins_slashes() {
        let dep = DependencyConfig {
            base_url: "http://localhost:3001/".into(),
            data_path: "data".into(),
            ..Default::default()
        };
        assert_eq!(dep.data_url(), "http://localhost:3001/data");
    }

    #[test]
    fn test_partial_toml() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [dependency]
            base_url = "http://10.0.0.5:3001"

            [retries]
            delay_ms = 50

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.dependency.base_url, "http://10.0.0.5:3001");
        assert_eq!(config.dependency.data_path, "/data");
        assert_eq!(config.retries.delay_ms, 50);
        assert_eq!(config.retries.max_attempts, 3);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
