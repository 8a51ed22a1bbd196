//! Request identification.
//!
//! # Responsibilities
//! - Name the request ID header shared by the set/propagate layers
//! - Read the ID back for structured logging
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - IDs are UUID v4 (`tower_http::request_id::MakeRequestUuid`)

use axum::http::HeaderMap;

pub use tower_http::request_id::MakeRequestUuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// The request ID assigned by the outer layers, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
