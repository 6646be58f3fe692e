//! Response mapping.
//!
//! # Responsibilities
//! - Render health reports in the public JSON shape
//! - Map dependency failure kinds to status codes (the only place this happens)
//! - Map user-resource errors to status codes
//!
//! # Status Codes
//! - `/health`: always 200
//! - `/external`: 200 success, 503 dependency HTTP error, 500 transport or internal failure
//! - users: 422 validation, 404 missing, 400 malformed JSON, 500 store failure

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::health::{
    DependencyFailure, DependencyReport, FailureKind, HealthReport, HealthStatus, StoreState,
};
use crate::store::StoreError;
use crate::users::ValidationErrors;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: HealthStatus,
    pub service: String,
    pub timestamp: String,
    pub version: String,
    pub database: StoreState,
}

impl From<&HealthReport> for HealthBody {
    fn from(report: &HealthReport) -> Self {
        Self {
            status: report.status,
            service: report.service_name.clone(),
            timestamp: report.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: report.version.clone(),
            database: report.local_store.unwrap_or(StoreState::Disconnected),
        }
    }
}

pub fn health_response(report: &HealthReport) -> Response {
    (StatusCode::OK, Json(HealthBody::from(report))).into_response()
}

/// Status code for a failed dependency probe.
pub fn failure_status(kind: &FailureKind) -> StatusCode {
    match kind {
        FailureKind::HttpStatus { .. } => StatusCode::SERVICE_UNAVAILABLE,
        FailureKind::Transport { .. } | FailureKind::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn dependency_success(report: &DependencyReport) -> Response {
    let body = json!({
        "status": "success",
        "message": "Communication with the data service established",
        "microservice_url": report.url,
        "response_time": report.latency.as_secs_f64(),
        "data": report.data,
    });
    (StatusCode::OK, Json(body)).into_response()
}

pub fn dependency_failure(failure: &DependencyFailure) -> Response {
    let status = failure_status(&failure.kind);
    let body = match &failure.kind {
        FailureKind::HttpStatus { code } => json!({
            "status": "error",
            "message": "Data service returned an error",
            "http_status": code,
            "microservice_url": failure.url,
        }),
        other => json!({
            "status": "error",
            "message": "Failed to communicate with the data service",
            "error": other.to_string(),
            "microservice_url": failure.url,
        }),
    };
    (status, Json(body)).into_response()
}

/// Errors surfaced by the user resource handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("user {0} not found")]
    NotFound(i64),

    #[error("unresolvable user id: {0}")]
    UnresolvedId(String),

    #[error("malformed request body: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "message": "The given data was invalid.", "errors": errors.fields })),
            )
                .into_response(),
            ApiError::NotFound(_) | ApiError::UnresolvedId(_) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "User not found" })),
            )
                .into_response(),
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Malformed request body", "error": detail })),
            )
                .into_response(),
            ApiError::Store(e) => {
                tracing::error!(error = %e, "Store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Internal server error", "error": e.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

/// JSON 404 for unknown routes.
pub fn route_not_found(method: &str, path: &str) -> Response {
    let body = json!({
        "error": "Endpoint not found",
        "message": format!("Route {} {} does not exist", method, path),
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
