//! Hide ignored paths and backend templates.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::files;
use crate::http::response;
use crate::http::server::AppState;

/// 404 for ignored paths, and for backend templates when a backend is set.
pub async fn ignore_filter(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let config = state.site.config();
    let path = req.uri().path();

    let backend_template = config.backend_url().is_some() && path.ends_with(config.backend_ext());
    if backend_template || files::is_ignored(path) {
        tracing::debug!(path = %path, "Ignored path requested");
        return response::not_found();
    }

    next.run(req).await
}
