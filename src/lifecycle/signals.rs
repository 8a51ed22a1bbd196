//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for Ctrl+C (SIGINT)
//! - Wait for an in-process shutdown request
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A failed signal handler installation leaves the broadcast as the only
//!   way to stop

use tokio::sync::broadcast;

/// Resolve on Ctrl+C or when the shutdown broadcast fires.
pub async fn shutdown_signal(mut rx: broadcast::Receiver<()>) {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = rx.recv() => tracing::info!("Shutdown requested"),
    }
}
