//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to dependency:
//!     → retries.rs (attempt loop under a RetryPolicy)
//!         → timeouts.rs (fresh deadline per attempt)
//!         → on failure: fixed delay, next attempt
//!     → first success, or the last failure once attempts run out
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retry policy is a value passed in, never hardcoded at the call site
//! - Nothing in here maps failures to HTTP status codes

pub mod retries;
pub mod timeouts;

pub use retries::{retry_with_policy, AttemptState, Retried, RetryExhausted, RetryPolicy};
pub use timeouts::{with_deadline, DeadlineElapsed};
