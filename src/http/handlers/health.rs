//! `GET /health` and `GET /external`.

use axum::{extract::State, response::Response};

use crate::http::response;
use crate::http::server::AppState;

/// Local store check. Always 200.
pub async fn health(State(state): State<AppState>) -> Response {
    let report = state.aggregator.check_self().await;
    tracing::debug!(status = ?report.status, database = ?report.local_store, "Self check complete");
    response::health_response(&report)
}

/// Dependency check with retries.
pub async fn external(State(state): State<AppState>) -> Response {
    match state.aggregator.check_dependency().await {
        Ok(report) => response::dependency_success(&report),
        Err(failure) => response::dependency_failure(&failure),
    }
}
