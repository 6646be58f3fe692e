//! Mock data service consumed by the user API.
//!
//! Serves static JSON only. `GET /data` is the endpoint `/external` probes.

use axum::{
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use user_api::config::ObservabilityConfig;
use user_api::lifecycle::signals;
use user_api::observability::logging;

const SERVICE: &str = "data-service";
const VERSION: &str = "1.0.0";

static STARTED: OnceLock<Instant> = OnceLock::new();

#[derive(Parser)]
#[command(name = "data-service")]
#[command(about = "Mock data service for the user API", long_about = None)]
struct Cli {
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    port: u16,

    #[arg(long, default_value = "0.0.0.0")]
    host: String,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn uptime_secs() -> f64 {
    STARTED.get().map(|t| t.elapsed().as_secs_f64()).unwrap_or_default()
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE,
        "timestamp": now(),
        "version": VERSION,
        "uptime": uptime_secs(),
    }))
}

async fn data() -> Json<Value> {
    Json(json!({
        "message": "Data from the data service",
        "timestamp": now(),
        "data": {
            "items": [
                { "id": 1, "name": "Item 1", "value": "Value A" },
                { "id": 2, "name": "Item 2", "value": "Value B" },
                { "id": 3, "name": "Item 3", "value": "Value C" },
            ],
            "total": 3,
            "source": SERVICE,
        },
        "meta": {
            "service": SERVICE,
            "version": VERSION,
            "environment": std::env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
        },
    }))
}

async fn info() -> Json<Value> {
    Json(json!({
        "service": "Data Service",
        "description": "Mock data service for the user API",
        "version": VERSION,
        "platform": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
        "pid": std::process::id(),
        "uptime": uptime_secs(),
        "timestamp": now(),
        "endpoints": [
            "GET /health - Health check",
            "GET /data - Mock data for the user API",
            "GET /info - Service information",
            "GET /users - Users mock data",
        ],
    }))
}

async fn users() -> Json<Value> {
    Json(json!({
        "message": "Mock user list",
        "data": [
            { "id": 101, "name": "Joao Node", "email": "joao@node.test", "service": SERVICE },
            { "id": 102, "name": "Maria Express", "email": "maria@express.test", "service": SERVICE },
            { "id": 103, "name": "Pedro API", "email": "pedro@api.test", "service": SERVICE },
        ],
        "total": 3,
        "source": SERVICE,
        "timestamp": now(),
    }))
}

async fn index() -> Json<Value> {
    Json(json!({
        "message": "Data Service API",
        "version": VERSION,
        "endpoints": {
            "health": "/health",
            "data": "/data",
            "info": "/info",
            "users": "/users",
        },
        "timestamp": now(),
    }))
}

async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint not found",
            "message": format!("Route {} {} does not exist", method, uri.path()),
            "available_endpoints": ["/", "/health", "/data", "/info", "/users"],
            "timestamp": now(),
        })),
    )
}

fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/data", get(data))
        .route("/info", get(info))
        .route("/users", get(users))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&ObservabilityConfig::default());
    STARTED.get_or_init(Instant::now);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "data-service listening");

    axum::serve(listener, router())
        .with_graceful_shutdown(signals::wait_for_signal())
        .await?;

    tracing::info!("data-service stopped");
    Ok(())
}
