//! Remote dependency subsystem.
//!
//! # Data Flow
//! ```text
//! HealthAggregator
//!     → caller.rs (RetryingCaller: attempt loop, fixed delay)
//!         → client.rs (DependencyClient: one GET under a deadline)
//!     → Retried<DependencyResponse> | RetryExhausted<CallError>
//! ```
//!
//! # Design Decisions
//! - The client never retries; the caller never classifies
//! - Failures are typed values, never panics or HTTP responses
//! - The client is a trait so tests can script outcomes

pub mod caller;
pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use caller::RetryingCaller;
pub use client::{DependencyClient, HttpDependencyClient};
pub use types::{CallError, DependencyResponse};
