//! Response construction helpers.
//!
//! # Responsibilities
//! - Build the HTML, JSON and plain responses every stage returns
//! - Keep content types consistent across templates, decorations and 404s
//!
//! # Design Decisions
//! - Bodies are fully buffered; templates render to bytes before a header is
//!   written, so render failures still become clean 404s

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

pub const HTML: &str = "text/html; charset=UTF-8";
pub const JSON: &str = "application/json";

/// Rendered HTML with the given status.
pub fn html(status: StatusCode, body: Vec<u8>) -> Response {
    with_type(status, HTML, body)
}

/// Pretty-printed JSON with the given status.
pub fn json(status: StatusCode, body: Vec<u8>) -> Response {
    with_type(status, JSON, body)
}

/// A body of arbitrary type. An invalid content type is dropped.
pub fn raw(status: StatusCode, content_type: Option<&str>, body: Vec<u8>) -> Response {
    let mut response = (status, Body::from(body)).into_response();
    if let Some(value) = content_type.and_then(|v| HeaderValue::from_str(v).ok()) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}

/// A redirect to `location`. Non-redirect codes fall back to 302.
pub fn redirect(code: StatusCode, location: &str) -> Response {
    let code = if code.is_redirection() { code } else { StatusCode::FOUND };
    match HeaderValue::from_str(location) {
        Ok(value) => (code, [(header::LOCATION, value)]).into_response(),
        Err(_) => status(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 page not found").into_response()
}

/// A plain error response for `code`.
pub fn status(code: StatusCode) -> Response {
    if code == StatusCode::NOT_FOUND {
        return not_found();
    }
    (code, code.canonical_reason().unwrap_or("Error")).into_response()
}

fn with_type(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> Response {
    (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_content_type() {
        let response = html(StatusCode::CREATED, b"<p>".to_vec());
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], HTML);
    }

    #[test]
    fn test_raw_keeps_or_drops_type() {
        let kept = raw(StatusCode::OK, Some("text/plain"), b"x".to_vec());
        assert_eq!(kept.headers()[header::CONTENT_TYPE], "text/plain");

        let dropped = raw(StatusCode::OK, Some("bad\nvalue"), b"x".to_vec());
        assert!(dropped.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_redirect() {
        let moved = redirect(StatusCode::MOVED_PERMANENTLY, "/new");
        assert_eq!(moved.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(moved.headers()[header::LOCATION], "/new");

        assert_eq!(redirect(StatusCode::OK, "/new").status(), StatusCode::FOUND);
    }

    #[test]
    fn test_not_found() {
        assert_eq!(not_found().status(), StatusCode::NOT_FOUND);
    }
}
