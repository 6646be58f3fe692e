//! User API with cross-service health checking.

pub mod config;
pub mod dependency;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod store;
pub mod users;

pub use config::ServiceConfig;
pub use health::HealthAggregator;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
