//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::http::StatusCode;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use user_api::config::ServiceConfig;
use user_api::http::HttpServer;
use user_api::lifecycle::Shutdown;
use user_api::store::SqliteStore;

/// A running user API bound to an ephemeral port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub client: reqwest::Client,
    pub db_path: PathBuf,
    // Keeps the database directory alive for the lifetime of the app.
    _db_dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config tuned for tests: fast retries, temp database, given dependency.
pub fn test_config(dependency: &str, db_dir: &TempDir) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.database.path = db_dir.path().join("users.sqlite");
    config.dependency.base_url = dependency.into();
    config.retries.max_attempts = 3;
    config.retries.delay_ms = 50;
    config.retries.attempt_timeout_ms = 300;
    config.timeouts.request_secs = 10;
    config
}

/// Start the user API against the given dependency base URL.
pub async fn start_app(dependency: &str) -> TestApp {
    start_app_with(dependency, |_| {}).await
}

pub async fn start_app_with(dependency: &str, tweak: impl FnOnce(&mut ServiceConfig)) -> TestApp {
    let db_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dependency, &db_dir);
    tweak(&mut config);

    // Mirrors startup: an unpreparable store is left for /health to report.
    let _ = SqliteStore::from_config(&config.database).initialize().await;

    let db_path = config.database.path.clone();
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    TestApp { addr, shutdown, client, db_path, _db_dir: db_dir }
}

fn status_line(status: u16) -> String {
    let code = StatusCode::from_u16(status).unwrap();
    format!("{} {}", code.as_u16(), code.canonical_reason().unwrap_or("Unknown"))
}

/// Start a programmable mock dependency. Returns its base URL.
pub async fn start_programmable_backend<F, Fut>(f: F) -> String
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                let _ = socket.read(&mut buf).await;

                let (status, body) = f().await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line(status),
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

/// Mock dependency that always answers with the same status and body.
pub async fn start_mock_backend(status: u16, body: &'static str) -> String {
    start_programmable_backend(move || async move { (status, body.to_string()) }).await
}

/// Mock dependency that accepts connections and never answers.
pub async fn start_stalled_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{}", addr)
}

/// Base URL of a port with nothing listening.
pub async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    tokio::time::sleep(Duration::from_millis(10)).await;
    format!("http://{}", addr)
}
