//! Static files and asset bundles.

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::response;
use super::server::AppState;
use crate::assets::kind::mime_for_extension;
use crate::files;
use crate::site::Site;

/// Site-relative file for a request path, `index.html` for directories.
///
/// Paths escaping the site root yield `None`.
pub fn file_for(path: &str) -> Option<String> {
    let rel = files::clean(path);
    if rel.split('/').any(|s| s == "..") {
        return None;
    }

    if path.ends_with('/') {
        return Some(if rel.is_empty() {
            "index.html".to_string()
        } else {
            format!("{}/index.html", rel)
        });
    }
    (!rel.is_empty()).then_some(rel)
}

/// Serve a file from the site root for GET and HEAD, if one exists.
pub async fn serve(site: &Site, method: &Method, path: &str, headers: &HeaderMap) -> Option<Response> {
    if method != Method::GET && method != Method::HEAD {
        return None;
    }

    let rel = file_for(path)?;
    if !site.fs().is_file(&rel) {
        return None;
    }

    if let Some(root) = site.fs().disk_root() {
        let mut file_req = Request::new(Body::empty());
        *file_req.method_mut() = method.clone();
        *file_req.headers_mut() = headers.clone();

        return match ServeFile::new(root.join(&rel)).oneshot(file_req).await {
            Ok(response) => Some(response.into_response()),
            Err(e) => {
                tracing::warn!(path = %rel, error = %e, "Failed to serve static file");
                None
            }
        };
    }

    match site.fs().read(&rel) {
        Ok(bytes) => {
            let content_type = mime_for_extension(files::extension(&rel));
            let body = if method == Method::HEAD { Vec::new() } else { bytes };
            Some(([(header::CONTENT_TYPE, content_type)], body).into_response())
        }
        Err(e) => {
            tracing::warn!(path = %rel, error = %e, "Failed to read static file");
            None
        }
    }
}

/// Serve a production asset bundle.
pub async fn serve_bundle(
    State(state): State<AppState>,
    Path(file): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(entry) = state.site.assets().bundle(&file) else {
        return response::not_found();
    };

    let last_modified = httpdate::fmt_http_date(entry.modified);

    if not_modified_since(&headers, entry.modified) {
        return (StatusCode::NOT_MODIFIED, [(header::LAST_MODIFIED, last_modified)]).into_response();
    }

    (
        [
            (header::CONTENT_TYPE, entry.mime.to_string()),
            (header::LAST_MODIFIED, last_modified),
        ],
        entry.bytes.clone(),
    )
        .into_response()
}

/// Whether `If-Modified-Since` covers `modified`, at one-second precision.
fn not_modified_since(headers: &HeaderMap, modified: SystemTime) -> bool {
    let Some(since) = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| httpdate::parse_http_date(v).ok())
    else {
        return false;
    };

    let secs = |t: SystemTime| t.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs());
    secs(modified) <= secs(since)
}
