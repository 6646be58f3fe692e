//! Retrying wrapper around a `DependencyClient`.

use std::sync::Arc;
use url::Url;

use crate::dependency::client::DependencyClient;
use crate::dependency::types::{CallError, DependencyResponse};
use crate::observability::metrics;
use crate::resilience::retries::{retry_with_policy, Retried, RetryExhausted, RetryPolicy};

/// Calls a dependency under a `RetryPolicy`.
///
/// Holds no per-call state, so one instance serves concurrent requests.
#[derive(Clone)]
pub struct RetryingCaller {
    client: Arc<dyn DependencyClient>,
}

impl RetryingCaller {
    pub fn new(client: Arc<dyn DependencyClient>) -> Self {
        Self { client }
    }

    /// First success, or the last failure after `policy.max_attempts()` attempts.
    pub async fn call_with_retry(
        &self,
        url: &Url,
        policy: &RetryPolicy,
    ) -> Result<Retried<DependencyResponse>, RetryExhausted<CallError>> {
        let timeout = policy.per_attempt_timeout();

        retry_with_policy(policy, |attempt| async move {
            tracing::debug!(url = %url, attempt, timeout = ?timeout, "Calling dependency");
            let result = self.client.call(url, timeout).await;
            match &result {
                Ok(response) => metrics::record_dependency_attempt("success", Some(response.latency)),
                Err(e) => metrics::record_dependency_attempt(e.kind(), None),
            }
            result
        })
        .await
    }
}
