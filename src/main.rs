//! Decorating template server.
//!
//! Renders a directory of HTML templates as a site, serves and bundles the
//! assets they reference, and decorates JSON from a backend API into
//! matching `.tmpl` templates.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────────┐
//!                    │                     SERVER                        │
//!   Client Request   │  ┌──────────┐   ┌────────────┐   ┌────────────┐   │
//!   ─────────────────┼─▶│ http     │──▶│ middleware │──▶│ pipeline   │   │
//!                    │  │ layers   │   │ prefix/    │   │ stages     │   │
//!                    │  └──────────┘   │ ignore/auth│   └─────┬──────┘   │
//!                    │                 └────────────┘         │          │
//!                    │         ┌───────────────┬──────────────┼────────┐ │
//!                    │         ▼               ▼              ▼        │ │
//!                    │  ┌────────────┐  ┌────────────┐  ┌───────────┐  │ │
//!                    │  │ template   │◀─│ assets     │  │ proxy     │──┼─┼──▶ Backend
//!                    │  │ engine     │  │ pipeline   │  │ decorator │  │ │
//!                    │  └─────┬──────┘  └─────┬──────┘  └───────────┘  │ │
//!                    │        └───────┬───────┘                        │ │
//!                    │                ▼                                │ │
//!                    │         ┌────────────┐                          │ │
//!                    │         │ files      │  site root on disk       │ │
//!                    │         └────────────┘                          │ │
//!                    └───────────────────────────────────────────────────┘
//! ```

use clap::Parser;

use decorating_proxy::cli::Cli;
use decorating_proxy::lifecycle::{self, Shutdown};
use decorating_proxy::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.into_config()?;

    logging::init(config.debug);

    tracing::info!("decorating-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    lifecycle::run(config, Shutdown::new()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
