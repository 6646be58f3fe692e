//! Metrics collection and exposition.
//!
//! # Metrics
//! - `user_api_requests_total` (counter): requests by method, route, status
//! - `user_api_request_duration_seconds` (histogram): handler latency
//! - `user_api_dependency_attempts_total` (counter): dependency attempts by outcome
//! - `user_api_dependency_latency_seconds` (histogram): latency of successful attempts
//! - `user_api_store_probe_total` (counter): local store probes by result
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "user_api_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("user_api_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// `outcome` is "success" or a `CallError::kind()` label.
pub fn record_dependency_attempt(outcome: &'static str, latency: Option<Duration>) {
    counter!("user_api_dependency_attempts_total", "outcome" => outcome).increment(1);
    if let Some(latency) = latency {
        histogram!("user_api_dependency_latency_seconds").record(latency.as_secs_f64());
    }
}

pub fn record_store_probe(reachable: bool) {
    let result = if reachable { "reachable" } else { "unreachable" };
    counter!("user_api_store_probe_total", "result" => result).increment(1);
}
