//! Basic auth middleware.
//! Enforces the configured `user:pass@path` rules.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::http::server::AppState;
use crate::security::access_control::REALM;

pub async fn basic_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if state.auth.is_empty() {
        return next.run(req).await;
    }

    let uri = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), |pq| pq.as_str().to_string());

    let Some(rule) = state.auth.rule_for(&uri) else {
        return next.run(req).await;
    };

    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if rule.accepts(authorization) {
        return next.run(req).await;
    }

    warn!(uri = %uri, "Rejected unauthenticated request");
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, format!("Basic realm=\"{}\"", REALM))],
        "Unauthorized",
    )
        .into_response()
}
