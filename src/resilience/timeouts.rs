//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap a single outbound call with a deadline
//! - Cancel the call cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Deadlines are per attempt, never per retry sequence

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// The wrapped future did not complete in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {0:?} elapsed")]
pub struct DeadlineElapsed(pub Duration);

/// Run `future` with a deadline. The future is dropped if it elapses.
pub async fn with_deadline<F, T>(deadline: Duration, future: F) -> Result<T, DeadlineElapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(deadline, future)
        .await
        .map_err(|_| DeadlineElapsed(deadline))
}
