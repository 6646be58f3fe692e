//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, metrics)
//! - Build the health aggregator and user repository from config
//! - Serve on a listener until shutdown

use axum::{
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ServiceConfig, ServiceInfo};
use crate::dependency::{HttpDependencyClient, RetryingCaller};
use crate::health::{AggregatorSettings, HealthAggregator};
use crate::http::handlers::{health, root, users};
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::observability::metrics;
use crate::store::{LocalStore, SqliteStore};
use crate::users::UserRepository;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<HealthAggregator>,
    pub users: UserRepository,
    pub service: ServiceInfo,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build dependency client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP server for the user API.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Result<Self, ServerError> {
        let store = SqliteStore::from_config(&config.database);
        let client = HttpDependencyClient::new(&config.dependency.user_agent)?;

        let aggregator = HealthAggregator::new(
            Arc::new(store.clone()) as Arc<dyn LocalStore>,
            RetryingCaller::new(Arc::new(client)),
            AggregatorSettings::from_config(&config),
        );

        let state = AppState {
            aggregator: Arc::new(aggregator),
            users: UserRepository::new(store),
            service: config.service.clone(),
        };

        Ok(Self::with_state(config, state))
    }

    /// Create a server around prebuilt state.
    pub fn with_state(config: ServiceConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let layers = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .route("/", get(root::index))
            .route("/health", get(health::health))
            .route("/external", get(health::external))
            .route("/users", get(users::index).post(users::store))
            .route(
                "/users/{id}",
                get(users::show).put(users::update).delete(users::destroy),
            )
            .fallback(root::not_found)
            .route_layer(middleware::from_fn(track_metrics))
            .with_state(state)
            .layer(layers)
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            dependency = %self.config.dependency.base_url,
            database = %self.config.database.path.display(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_user_agent_fails_server_build() {
        let mut config = ServiceConfig::default();
        config.dependency.user_agent = "user-api\nbroken".into();

        match HttpServer::new(config) {
            Err(ServerError::Client(e)) => assert!(e.is_builder(), "got {}", e),
            Ok(_) => panic!("expected client build failure"),
        }
    }
}
