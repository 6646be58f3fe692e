//! In-process `DependencyClient` fake for unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

use crate::dependency::client::DependencyClient;
use crate::dependency::types::{CallError, DependencyResponse};

/// Replays a fixed script of outcomes; repeats the final one once exhausted.
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<DependencyResponse, CallError>>>,
    last: Mutex<Option<Result<DependencyResponse, CallError>>>,
    timeouts: Mutex<Vec<Duration>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<Result<DependencyResponse, CallError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            timeouts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(outcome: Result<DependencyResponse, CallError>) -> Self {
        Self::new(vec![outcome])
    }

    pub fn ok_body(body: serde_json::Value) -> DependencyResponse {
        DependencyResponse {
            status: 200,
            body,
            latency: Duration::from_millis(12),
        }
    }

    pub fn calls(&self) -> usize {
        self.timeouts.lock().unwrap().len()
    }

    pub fn timeouts(&self) -> Vec<Duration> {
        self.timeouts.lock().unwrap().clone()
    }
}

#[async_trait]
impl DependencyClient for ScriptedClient {
    async fn call(&self, _url: &Url, timeout: Duration) -> Result<DependencyResponse, CallError> {
        self.timeouts.lock().unwrap().push(timeout);
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = Some(next);
        }
        last.clone().unwrap_or(Err(CallError::Transport("empty script".into())))
    }
}
