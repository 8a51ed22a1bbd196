//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Pick the default filter from the debug flag
//!
//! # Design Decisions
//! - `RUST_LOG` always wins over the built-in default
//! - Debug mode also surfaces per-request tower-http traces

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for the given verbosity.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "decorating_proxy=debug,tower_http=debug"
    } else {
        "decorating_proxy=info,tower_http=info"
    }
}

/// Install the global subscriber.
pub fn init(debug: bool) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug).into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
