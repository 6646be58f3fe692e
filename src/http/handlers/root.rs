//! API banner and JSON fallback.

use axum::{
    extract::State,
    http::{Method, Uri},
    response::Response,
    Json,
};
use serde_json::{json, Value};

use crate::http::response;
use crate::http::server::AppState;

pub async fn index(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "User API",
        "service": state.service.name,
        "version": state.service.version,
        "endpoints": {
            "health": "/health",
            "external": "/external",
            "users": "/users",
        },
    }))
}

pub async fn not_found(method: Method, uri: Uri) -> Response {
    response::route_not_found(method.as_str(), uri.path())
}
