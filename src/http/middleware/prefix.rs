//! Mount the site under the front-end URL path.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::with_path;
use crate::files;
use crate::http::response;
use crate::http::server::AppState;

/// Strip the front-end path from the request URI.
///
/// Requests outside the prefix are answered with 404. Extension-less paths
/// get a trailing slash, so `/app/about` renders `about/index.html`.
pub async fn strip_prefix(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let prefix = state.site.config().frontend_path();
    if prefix.is_empty() {
        return next.run(req).await;
    }

    let Some(path) = rewrite(&prefix, req.uri().path()) else {
        return response::not_found();
    };

    match with_path(req.uri(), &path) {
        Some(uri) => *req.uri_mut() = uri,
        None => return response::not_found(),
    }

    next.run(req).await
}

/// The site-relative path for `path` under `prefix`, if it is inside it.
pub fn rewrite(prefix: &str, path: &str) -> Option<String> {
    let rest = path.strip_prefix(prefix)?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }

    let mut rest = if rest.is_empty() { "/".to_string() } else { rest.to_string() };
    if files::extension(&rest).is_empty() && !rest.ends_with('/') {
        rest.push('/');
    }
    Some(rest)
}
