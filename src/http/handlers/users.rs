//! User resource handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::users::password::hash_password;
use crate::users::repository::is_unique_violation;
use crate::users::{validate_create, validate_update, NewUser, UserChanges, UserPayload, ValidationErrors};

type ApiResult<T> = Result<T, ApiError>;

fn payload(body: Result<Json<UserPayload>, JsonRejection>) -> ApiResult<UserPayload> {
    body.map(|Json(p)| p).map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// A non-numeric id cannot name a user.
fn user_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    path.map(|Path(id)| id).map_err(|e| ApiError::UnresolvedId(e.body_text()))
}

fn unique_email(err: crate::store::StoreError) -> ApiError {
    if is_unique_violation(&err) {
        ApiError::Validation(ValidationErrors::email_taken())
    } else {
        ApiError::Store(err)
    }
}

pub async fn index(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let users = state.users.list().await?;
    let data: Vec<Value> = users
        .iter()
        .map(|u| json!({ "id": u.id, "name": u.name, "email": u.email, "created_at": u.created_at }))
        .collect();

    Ok(Json(json!({ "total": data.len(), "data": data })))
}

pub async fn store(
    State(state): State<AppState>,
    body: Result<Json<UserPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let fields = validate_create(&payload(body)?)?;

    if state.users.email_taken(&fields.email, None).await? {
        return Err(ValidationErrors::email_taken().into());
    }

    let user = state
        .users
        .create(NewUser {
            name: fields.name,
            email: fields.email,
            password_hash: hash_password(&fields.password),
        })
        .await
        .map_err(unique_email)?;

    tracing::info!(user_id = user.id, "User created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "data": { "id": user.id, "name": user.name, "email": user.email, "created_at": user.created_at },
        })),
    ))
}

pub async fn show(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let id = user_id(path)?;
    let user = state.users.find(id).await?.ok_or(ApiError::NotFound(id))?;
    Ok(Json(json!({
        "data": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "created_at": user.created_at,
            "updated_at": user.updated_at,
        }
    })))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UserPayload>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let id = user_id(path)?;
    if state.users.find(id).await?.is_none() {
        return Err(ApiError::NotFound(id));
    }

    let fields = validate_update(&payload(body)?)?;
    if let Some(email) = &fields.email {
        if state.users.email_taken(email, Some(id)).await? {
            return Err(ValidationErrors::email_taken().into());
        }
    }

    let changes = UserChanges {
        name: fields.name,
        email: fields.email,
        password_hash: fields.password.as_deref().map(hash_password),
    };
    let user = state
        .users
        .update(id, changes)
        .await
        .map_err(unique_email)?
        .ok_or(ApiError::NotFound(id))?;

    tracing::info!(user_id = user.id, "User updated");
    Ok(Json(json!({
        "message": "User updated successfully",
        "data": { "id": user.id, "name": user.name, "email": user.email, "updated_at": user.updated_at },
    })))
}

pub async fn destroy(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let id = user_id(path)?;
    let user = state.users.delete(id).await?.ok_or(ApiError::NotFound(id))?;
    tracing::info!(user_id = user.id, "User deleted");
    Ok(Json(json!({ "message": format!("User '{}' deleted successfully", user.name) })))
}
