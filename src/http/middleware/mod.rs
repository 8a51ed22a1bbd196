//! Request middlewares run before route dispatch.
//!
//! Order, outermost first: real IP, then (inside the URI-rewriting service)
//! prefix strip, security headers, ignore filter, basic auth.

pub mod access_control;
pub mod ignore;
pub mod prefix;
pub mod real_ip;

pub use access_control::basic_auth;
pub use ignore::ignore_filter;
pub use prefix::strip_prefix;
pub use real_ip::{real_ip, ClientIp};

use axum::http::uri::{PathAndQuery, Uri};

/// Replace the path of `uri`, keeping its query.
pub(crate) fn with_path(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse::<PathAndQuery>().ok()?);
    Uri::from_parts(parts).ok()
}
