//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Metrics → Site → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Broadcast triggered → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl+C) or broadcast → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Startup fails fast on invalid config or an unbindable address
//! - A production compile failure at startup is logged, not fatal
//! - Shutdown waits for in-flight requests (axum graceful shutdown)

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{run, StartupError};
