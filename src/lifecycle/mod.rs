//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Prepare store → Bind listener
//!
//! Shutdown:
//!     signals.rs (SIGTERM/SIGINT) → shutdown.rs trigger → server drains → Exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
