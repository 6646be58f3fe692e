//! SQLite-backed local store.

use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;
use crate::store::{LocalStore, StoreError, StoreProbe, StoreResult};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to a SQLite database file.
///
/// Cheap to clone; holds no open connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
    probe_timeout: Duration,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>, probe_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            probe_timeout,
        }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(config.path.clone(), config.probe_timeout())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and schema.
    pub async fn initialize(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.run(|_| Ok(())).await?;
        tracing::info!(path = %self.path.display(), "Local store initialized");
        Ok(())
    }

    /// Run `op` against a fresh connection on a blocking worker.
    pub async fn run<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = open(&path)?;
            conn.execute_batch(SCHEMA)?;
            op(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Worker(e.to_string()))?
    }
}

fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

/// Open an existing database only; a missing file is an error.
fn open_existing(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

#[async_trait]
impl LocalStore for SqliteStore {
    async fn probe(&self) -> StoreProbe {
        let path = self.path.clone();
        let task = tokio::task::spawn_blocking(move || -> rusqlite::Result<()> {
            let conn = open_existing(&path)?;
            conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        });

        let probe = match with_deadline(self.probe_timeout, task).await {
            Ok(Ok(Ok(()))) => StoreProbe::Reachable,
            Ok(Ok(Err(e))) => StoreProbe::Unreachable { reason: e.to_string() },
            Ok(Err(e)) => StoreProbe::Unreachable {
                reason: format!("probe worker failed: {}", e),
            },
            Err(elapsed) => StoreProbe::Unreachable { reason: elapsed.to_string() },
        };

        metrics::record_store_probe(probe.is_reachable());
        if let StoreProbe::Unreachable { reason } = &probe {
            tracing::warn!(path = %self.path.display(), reason = %reason, "Local store unreachable");
        }
        probe
    }
}
