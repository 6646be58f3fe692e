//! User API service.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────┐
//!                  │                  USER API                    │
//!   Client         │  ┌────────┐   ┌──────────┐   ┌────────────┐  │
//!   ───────────────┼─▶│  http  │──▶│ handlers │──▶│   users    │──┼──▶ SQLite
//!                  │  │ server │   └────┬─────┘   │ repository │  │
//!                  │  └────────┘        │         └────────────┘  │
//!                  │                    ▼                         │
//!                  │            ┌───────────────┐                 │
//!                  │            │    health     │── probe ────────┼──▶ SQLite
//!                  │            │  aggregator   │                 │
//!                  │            └──────┬────────┘                 │
//!                  │                   ▼                          │
//!                  │  ┌────────────────────────────────────┐      │
//!                  │  │ dependency: RetryingCaller         │      │
//!                  │  │   → resilience (retry + deadline)  │──────┼──▶ data-service
//!                  │  │   → DependencyClient (reqwest)     │      │
//!                  │  └────────────────────────────────────┘      │
//!                  └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use user_api::config::load_config;
use user_api::lifecycle::{signals, Shutdown};
use user_api::observability::{logging, metrics};
use user_api::store::SqliteStore;
use user_api::HttpServer;

#[derive(Parser)]
#[command(name = "user-api")]
#[command(about = "User API with cross-service health checks", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "USER_API_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        dependency = %config.dependency.base_url,
        max_attempts = config.retries.max_attempts,
        request_timeout_secs = config.timeouts.request_secs,
        "user-api starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    // A store that cannot be prepared is reported by /health, not fatal.
    if let Err(e) = SqliteStore::from_config(&config.database).initialize().await {
        tracing::warn!(
            path = %config.database.path.display(),
            error = %e,
            "Local store unavailable at startup"
        );
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    let mut server_task = tokio::spawn(server.run(listener, server_shutdown));

    let stopped_early = tokio::select! {
        _ = signals::wait_for_signal() => false,
        result = &mut server_task => {
            result??;
            true
        }
    };

    if !stopped_early {
        shutdown.trigger();
        server_task.await??;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
