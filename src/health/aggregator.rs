//! Composite health checks.
//!
//! # Responsibilities
//! - Self check: probe the local store, report ok or warning
//! - Dependency check: call the data service under the retry policy
//! - Turn probe outcomes into `HealthReport` / `DependencyFailure`

use chrono::Utc;
use std::sync::Arc;
use url::Url;

use crate::config::ServiceConfig;
use crate::dependency::RetryingCaller;
use crate::health::report::{
    DependencyFailure, DependencyReport, FailureKind, HealthReport, HealthStatus, RemoteState,
    StoreState,
};
use crate::resilience::retries::RetryPolicy;
use crate::store::{LocalStore, StoreProbe};

/// Everything the aggregator needs to know, passed in explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorSettings {
    pub service_name: String,
    pub version: String,
    /// Base URL reported back to callers.
    pub dependency_base_url: String,
    /// URL actually probed.
    pub dependency_url: String,
    pub policy: RetryPolicy,
}

impl AggregatorSettings {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            service_name: config.service.name.clone(),
            version: config.service.version.clone(),
            dependency_base_url: config.dependency.base_url.clone(),
            dependency_url: config.dependency.data_url(),
            policy: RetryPolicy::from(&config.retries),
        }
    }
}

pub struct HealthAggregator {
    store: Arc<dyn LocalStore>,
    caller: RetryingCaller,
    settings: AggregatorSettings,
}

impl HealthAggregator {
    pub fn new(store: Arc<dyn LocalStore>, caller: RetryingCaller, settings: AggregatorSettings) -> Self {
        Self { store, caller, settings }
    }

    /// Probe the local store. Always produces a report.
    pub async fn check_self(&self) -> HealthReport {
        let (status, state) = match self.store.probe().await {
            StoreProbe::Reachable => (HealthStatus::Ok, StoreState::Connected),
            StoreProbe::Unreachable { .. } => (HealthStatus::Warning, StoreState::Disconnected),
        };

        let mut report = self.base_report(status);
        report.local_store = Some(state);
        report
    }

    /// Probe the remote dependency under the configured retry policy.
    pub async fn check_dependency(&self) -> Result<DependencyReport, DependencyFailure> {
        let url = match Url::parse(&self.settings.dependency_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(url = %self.settings.dependency_url, error = %e, "Invalid dependency URL");
                return Err(self.failure(FailureKind::Internal { message: e.to_string() }, 0));
            }
        };

        match self.caller.call_with_retry(&url, &self.settings.policy).await {
            Ok(retried) => {
                let response = retried.value;
                tracing::info!(
                    url = %url,
                    attempts = retried.attempts,
                    latency_ms = response.latency.as_millis() as u64,
                    "Dependency check succeeded"
                );

                let mut report = self.base_report(HealthStatus::Ok);
                report.remote = Some(RemoteState::Success);
                report.remote_latency = Some(response.latency);

                Ok(DependencyReport {
                    report,
                    url: self.settings.dependency_base_url.clone(),
                    data: response.body,
                    latency: response.latency,
                    attempts: retried.attempts,
                })
            }
            Err(exhausted) => {
                tracing::error!(
                    url = %url,
                    attempts = exhausted.attempts,
                    error = %exhausted.error,
                    "Dependency check failed"
                );
                Err(self.failure(FailureKind::from(exhausted.error), exhausted.attempts))
            }
        }
    }

    fn failure(&self, kind: FailureKind, attempts: u32) -> DependencyFailure {
        let mut report = self.base_report(HealthStatus::Error);
        report.remote = Some(RemoteState::from(&kind));
        DependencyFailure {
            report,
            url: self.settings.dependency_base_url.clone(),
            kind,
            attempts,
        }
    }

    fn base_report(&self, status: HealthStatus) -> HealthReport {
        HealthReport {
            status,
            service_name: self.settings.service_name.clone(),
            version: self.settings.version.clone(),
            timestamp: Utc::now(),
            local_store: None,
            remote: None,
            remote_latency: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::testing::ScriptedClient;
    use crate::dependency::CallError;
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedStore(bool);

    #[async_trait]
    impl LocalStore for FixedStore {
        async fn probe(&self) -> StoreProbe {
            if self.0 {
                StoreProbe::Reachable
            } else {
                StoreProbe::Unreachable { reason: "connection refused".into() }
            }
        }
    }

    fn settings() -> AggregatorSettings {
        AggregatorSettings {
            service_name: "user-api".into(),
            version: "1.0.0".into(),
            dependency_base_url: "http://data.test".into(),
            dependency_url: "http://data.test/data".into(),
            policy: RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(100)),
        }
    }

    fn aggregator(store_up: bool, client: Arc<ScriptedClient>) -> HealthAggregator {
        HealthAggregator::new(
            Arc::new(FixedStore(store_up)),
            RetryingCaller::new(client),
            settings(),
        )
    }

    fn unused_client() -> Arc<ScriptedClient> {
        Arc::new(ScriptedClient::always(Err(CallError::Transport("unused".into()))))
    }

    #[tokio::test]
    async fn test_self_check_ok() {
        let report = aggregator(true, unused_client()).check_self().await;
        assert_eq!(report.status, HealthStatus::Ok);
        assert_eq!(report.local_store, Some(StoreState::Connected));
        assert_eq!(report.remote, None);
    }

    #[tokio::test]
    async fn test_self_check_warning_when_store_down() {
        let client = unused_client();
        let agg = aggregator(false, client.clone());
        let first = agg.check_self().await;
        let second = agg.check_self().await;

        assert_eq!(first.status, HealthStatus::Warning);
        assert_eq!(first.local_store, Some(StoreState::Disconnected));
        assert_eq!(first.local_store, second.local_store);
        assert_eq!(client.calls(), 0, "self check never calls the dependency");
    }

    #[tokio::test]
    async fn test_dependency_success() {
        let client = Arc::new(ScriptedClient::always(Ok(ScriptedClient::ok_body(
            serde_json::json!({"data": {"total": 3}}),
        ))));
        let report = aggregator(true, client.clone()).check_dependency().await.unwrap();

        assert_eq!(report.report.status, HealthStatus::Ok);
        assert_eq!(report.report.remote, Some(RemoteState::Success));
        assert_eq!(report.report.remote_latency, Some(Duration::from_millis(12)));
        assert_eq!(report.data["data"]["total"], 3);
        assert_eq!(report.attempts, 1);
        assert_eq!(report.url, "http://data.test");
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_dependency_http_error_is_terminal() {
        let client = Arc::new(ScriptedClient::always(Err(CallError::HttpStatus { code: 500 })));
        let failure = aggregator(false, client.clone()).check_dependency().await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::HttpStatus { code: 500 });
        assert_eq!(failure.report.status, HealthStatus::Error);
        assert_eq!(failure.report.remote, Some(RemoteState::HttpError { code: 500 }));
        assert_eq!(failure.attempts, 3);
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_dependency_timeout_reports_transport() {
        let client = Arc::new(ScriptedClient::always(Err(CallError::Timeout {
            after: Duration::from_millis(100),
        })));
        let failure = aggregator(true, client).check_dependency().await.unwrap_err();

        match failure.kind {
            FailureKind::Transport { message } => assert!(message.contains("timed out")),
            other => panic!("expected transport failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_is_internal() {
        let client = unused_client();
        let mut bad = settings();
        bad.dependency_url = "not a url".into();
        let agg = HealthAggregator::new(Arc::new(FixedStore(true)), RetryingCaller::new(client.clone()), bad);

        let failure = agg.check_dependency().await.unwrap_err();
        assert!(matches!(failure.kind, FailureKind::Internal { .. }));
        assert_eq!(failure.attempts, 0);
        assert_eq!(client.calls(), 0);
    }
}
