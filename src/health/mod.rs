//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health:
//!     aggregator.check_self()
//!     → LocalStore::probe()
//!     → HealthReport (ok | warning), never an error
//!
//! GET /external:
//!     aggregator.check_dependency()
//!     → RetryingCaller (fixed policy) → DependencyClient
//!     → DependencyReport | DependencyFailure
//! ```
//!
//! # Design Decisions
//! - Reports are built per request; nothing is cached between checks
//! - A dependency failure is a terminal error envelope, not a warning
//! - Mapping to HTTP status codes happens in `http::response`

pub mod aggregator;
pub mod report;

pub use aggregator::{AggregatorSettings, HealthAggregator};
pub use report::{
    DependencyFailure, DependencyReport, FailureKind, HealthReport, HealthStatus, RemoteState,
    StoreState,
};
