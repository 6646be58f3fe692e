//! User entity and request payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored user. The password hash never leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new row, already validated and hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// Raw request body for create and update.
///
/// Fields stay untyped so validation can report type errors per field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present")]
    pub password: Option<serde_json::Value>,
}

/// Keep explicit `null` as `Some(Value::Null)` so it differs from an absent key.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}
