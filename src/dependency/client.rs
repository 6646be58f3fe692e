//! Single-attempt HTTP client for the data service.
//!
//! # Responsibilities
//! - Issue one GET under a deadline
//! - Decode the JSON body and measure elapsed time
//! - Classify failures as timeout, transport, decode or HTTP status
//!
//! No retries happen at this layer.

use async_trait::async_trait;
use std::error::Error as _;
use std::time::{Duration, Instant};
use url::Url;

use crate::dependency::types::{CallError, DependencyResponse};
use crate::resilience::timeouts::{with_deadline, DeadlineElapsed};

/// One outbound call to a remote dependency.
#[async_trait]
pub trait DependencyClient: Send + Sync {
    async fn call(&self, url: &Url, timeout: Duration) -> Result<DependencyResponse, CallError>;
}

/// `DependencyClient` backed by `reqwest`.
#[derive(Clone)]
pub struct HttpDependencyClient {
    client: reqwest::Client,
}

impl HttpDependencyClient {
    /// Build a client. Service-to-service calls bypass system proxies.
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DependencyClient for HttpDependencyClient {
    async fn call(&self, url: &Url, timeout: Duration) -> Result<DependencyResponse, CallError> {
        let start = Instant::now();

        let outcome = with_deadline(timeout, async {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| CallError::Transport(describe(&e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(CallError::HttpStatus { code: status.as_u16() });
            }

            let body = response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| CallError::Decode(describe(&e)))?;
            Ok((status.as_u16(), body))
        })
        .await;

        let latency = start.elapsed();
        match outcome {
            Ok(Ok((status, body))) => {
                tracing::debug!(url = %url, status, latency_ms = latency.as_millis() as u64, "Dependency responded");
                Ok(DependencyResponse { status, body, latency })
            }
            Ok(Err(e)) => Err(e),
            Err(DeadlineElapsed(after)) => Err(CallError::Timeout { after }),
        }
    }
}

/// Flatten a reqwest error and its sources into one line.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
