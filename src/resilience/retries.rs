//! Retry logic.
//!
//! # Responsibilities
//! - Describe a bounded retry policy (attempt count, fixed delay, per-attempt timeout)
//! - Execute an async operation under that policy
//! - Track the attempt state machine for logging
//!
//! # Design Decisions
//! - Constant delay between attempts, no backoff growth
//! - Every failure consumes an attempt, whatever its kind
//! - First success returns immediately; no delay after the last failure
//! - On exhaustion the last error is returned verbatim
//! - Delays are `tokio::time::sleep`, so only the calling task waits

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Bounded, fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    inter_attempt_delay: Duration,
    per_attempt_timeout: Duration,
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, inter_attempt_delay: Duration, per_attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            inter_attempt_delay,
            per_attempt_timeout,
        }
    }

    /// Policy used by the dependency probe: 3 attempts, 1s apart, 10s each.
    pub fn dependency_probe() -> Self {
        Self::new(3, Duration::from_millis(1000), Duration::from_secs(10))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn inter_attempt_delay(&self) -> Duration {
        self.inter_attempt_delay
    }

    pub fn per_attempt_timeout(&self) -> Duration {
        self.per_attempt_timeout
    }

    /// Longest a full retry sequence can take; `None` if it overflows `Duration`.
    pub fn worst_case_latency(&self) -> Option<Duration> {
        let attempts = self.per_attempt_timeout.checked_mul(self.max_attempts)?;
        let delays = self.inter_attempt_delay.checked_mul(self.max_attempts - 1)?;
        attempts.checked_add(delays)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::dependency_probe()
    }
}

/// State of a single retry sequence.
///
/// ```text
/// Pending → Attempting(1) → Succeeded
///                         → Attempting(n+1)   (n < max)
///                         → Failed            (n = max)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Pending,
    Attempting(u32),
    Succeeded,
    Failed,
}

impl AttemptState {
    /// Start the first attempt.
    pub fn begin(self) -> Self {
        match self {
            AttemptState::Pending => AttemptState::Attempting(1),
            other => other,
        }
    }

    /// Transition after the current attempt succeeded.
    pub fn on_success(self) -> Self {
        match self {
            AttemptState::Attempting(_) => AttemptState::Succeeded,
            other => other,
        }
    }

    /// Transition after the current attempt failed.
    pub fn on_failure(self, max_attempts: u32) -> Self {
        match self {
            AttemptState::Attempting(n) if n < max_attempts => AttemptState::Attempting(n + 1),
            AttemptState::Attempting(_) => AttemptState::Failed,
            other => other,
        }
    }
}

/// A successful result and the number of attempts it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
}

/// The last error of an exhausted retry sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryExhausted<E> {
    pub error: E,
    pub attempts: u32,
}

/// Run `operation` under `policy`.
///
/// The closure receives the 1-based attempt number.
pub async fn retry_with_policy<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<Retried<T>, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut state = AttemptState::Pending.begin();
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                state = state.on_success();
                tracing::debug!(attempt, ?state, "Attempt succeeded");
                return Ok(Retried { value, attempts: attempt });
            }
            Err(error) => {
                state = state.on_failure(policy.max_attempts());
                let AttemptState::Attempting(next) = state else {
                    tracing::warn!(
                        attempts = attempt,
                        error = %error,
                        "Retries exhausted"
                    );
                    return Err(RetryExhausted { error, attempts: attempt });
                };

                tracing::info!(
                    attempt,
                    max_attempts = policy.max_attempts(),
                    delay = ?policy.inter_attempt_delay(),
                    error = %error,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(policy.inter_attempt_delay()).await;
                attempt = next;
            }
        }
    }
}
