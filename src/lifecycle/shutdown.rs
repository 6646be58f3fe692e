//! Shutdown coordination.
//!
//! `HttpServer::run` subscribes and drains in-flight requests (including a
//! dependency check mid-retry) once the signal fires. Nothing else holds a
//! receiver in the service; integration tests trigger it when a test app drops.

use tokio::sync::broadcast;

/// Broadcast coordinator for graceful shutdown.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscriber. Returns how many were listening.
    pub fn trigger(&self) -> usize {
        match self.tx.send(()) {
            Ok(listeners) => {
                tracing::info!(listeners, "Shutdown triggered");
                listeners
            }
            // The server already stopped on its own.
            Err(_) => 0,
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
