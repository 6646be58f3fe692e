//! User persistence on top of `SqliteStore`.

use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, OptionalExtension, Row};

use crate::store::{SqliteStore, StoreError, StoreResult};
use crate::users::model::{NewUser, User, UserChanges};

const COLUMNS: &str = "id, name, email, password, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
    store: SqliteStore,
}

impl UserRepository {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> StoreResult<Vec<User>> {
        self.store
            .run(|conn| {
                let mut stmt = conn.prepare(&format!("SELECT {} FROM users ORDER BY id", COLUMNS))?;
                let users = stmt
                    .query_map([], row_to_user)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(users)
            })
            .await
    }

    pub async fn find(&self, id: i64) -> StoreResult<Option<User>> {
        self.store.run(move |conn| Ok(find_by_id(conn, id)?)).await
    }

    /// Whether `email` belongs to a user other than `except`.
    pub async fn email_taken(&self, email: &str, except: Option<i64>) -> StoreResult<bool> {
        let email = email.to_string();
        self.store
            .run(move |conn| {
                let taken: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 AND id != ?2)",
                    params![email, except.unwrap_or(-1)],
                    |row| row.get(0),
                )?;
                Ok(taken)
            })
            .await
    }

    pub async fn create(&self, user: NewUser) -> StoreResult<User> {
        self.store
            .run(move |conn| {
                let now = Utc::now().to_rfc3339();
                conn.execute(
                    "INSERT INTO users (name, email, password, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4)",
                    params![user.name, user.email, user.password_hash, now],
                )?;
                let id = conn.last_insert_rowid();
                find_by_id(conn, id)?.ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
            })
            .await
    }

    /// Apply `changes`; `None` when the user does not exist.
    pub async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<Option<User>> {
        self.store
            .run(move |conn| {
                let tx = conn.transaction()?;
                let Some(current) = find_by_id(&tx, id)? else {
                    return Ok(None);
                };

                tx.execute(
                    "UPDATE users SET name = ?1, email = ?2, password = ?3, updated_at = ?4 WHERE id = ?5",
                    params![
                        changes.name.unwrap_or(current.name),
                        changes.email.unwrap_or(current.email),
                        changes.password_hash.unwrap_or(current.password_hash),
                        Utc::now().to_rfc3339(),
                        id
                    ],
                )?;
                let updated = find_by_id(&tx, id)?;
                tx.commit()?;
                Ok(updated)
            })
            .await
    }

    /// Delete and return the user; `None` when the user does not exist.
    pub async fn delete(&self, id: i64) -> StoreResult<Option<User>> {
        self.store
            .run(move |conn| {
                let tx = conn.transaction()?;
                let existing = find_by_id(&tx, id)?;
                if existing.is_some() {
                    tx.execute("DELETE FROM users WHERE id = ?1", params![id])?;
                }
                tx.commit()?;
                Ok(existing)
            })
            .await
    }
}

/// True when the error is a UNIQUE constraint violation.
pub fn is_unique_violation(error: &StoreError) -> bool {
    matches!(
        error,
        StoreError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn find_by_id(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", COLUMNS),
        params![id],
        row_to_user,
    )
    .optional()
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: timestamp(row, 4)?,
        updated_at: timestamp(row, 5)?,
    })
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
