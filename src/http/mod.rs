//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (recovery, request ID, tracing, real IP)
//!     → middleware/ (prefix strip → security headers → ignore filter → basic auth)
//!     → user layers
//!     → /assets/<root>/{file} → static_files.rs (bundles)
//!     → custom routes (HttpServer::route, HttpServer::redirect)
//!     → everything else → pipeline.rs (templates, static, no-cache, proxy, 404)
//!     → response.rs (content types, error bodies)
//!     → Send to client
//! ```

pub mod middleware;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;
pub mod static_files;

pub use pipeline::{NotFoundHandler, Stage};
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
