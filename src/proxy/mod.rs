//! Backend proxy and JSON decoration.
//!
//! # Data Flow
//! ```text
//! unmatched request
//!     → decorator.rs: same method, filtered headers and body to
//!       <backend><request uri without leading slash>
//!     → backend response (status, content type, body bytes)
//!     → <path without extension>.tmpl exists?
//!         yes: body parsed as a JSON object, rendered, backend status
//!         no:  JSON re-indented (indent.rs), or passed through unchanged
//! ```
//!
//! # Design Decisions
//! - One best-effort round trip: no retries, pooling policy or streaming
//! - Transport failures answer the request with 502 (504 on timeout); the
//!   process keeps serving
//! - Malformed JSON for an existing template is a render failure (404)
//! - Client encodings and credentials stay at this hop: the backend always
//!   answers in identity encoding and never sees the site's basic auth

pub mod decorator;
pub mod indent;

pub use decorator::ProxyDecorator;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::template::TemplateError;

/// Errors raised while proxying a request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to build backend client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),

    #[error("backend request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("backend did not answer in time")]
    Timeout,

    #[error("failed to decorate response: {0}")]
    Decorate(#[from] TemplateError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::RequestBody(_) => StatusCode::BAD_REQUEST,
            ProxyError::Transport(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Decorate(e) => e.status(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ProxyError::Transport(_) => "Upstream request failed",
            ProxyError::Timeout => "Upstream request timed out",
            _ => status.canonical_reason().unwrap_or("Error"),
        };
        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ProxyError::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            ProxyError::Decorate(TemplateError::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ProxyError::Decorate(TemplateError::Task("panicked".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_response() {
        let response = ProxyError::Timeout.into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
