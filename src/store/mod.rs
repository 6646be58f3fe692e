//! Local persistent store.
//!
//! # Data Flow
//! ```text
//! /health → LocalStore::probe() → StoreProbe (Reachable | Unreachable)
//! /users  → UserRepository → SqliteStore::run(closure on a blocking worker)
//! ```
//!
//! # Design Decisions
//! - Probing never fails; every error becomes `StoreProbe::Unreachable`
//! - Connections are opened per operation and dropped at scope end
//! - SQLite work runs on `spawn_blocking`, off the async workers

pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

pub use sqlite::SqliteStore;

/// Outcome of a reachability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreProbe {
    Reachable,
    Unreachable { reason: String },
}

impl StoreProbe {
    pub fn is_reachable(&self) -> bool {
        matches!(self, StoreProbe::Reachable)
    }
}

/// Something whose reachability can be checked.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn probe(&self) -> StoreProbe;
}

/// Errors from store operations other than probing.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store worker failed: {0}")]
    Worker(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
