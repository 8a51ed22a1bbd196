//! Client IP resolution.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::net::{IpAddr, SocketAddr};

use crate::http::server::AppState;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// The client address recorded for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

/// Record the client IP as a request extension.
///
/// Forwarding headers are only trusted when the site runs behind a proxy.
pub async fn real_ip(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let forwarded = if state.site.config().proxy {
        forwarded_ip(req.headers())
    } else {
        None
    };
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Some(ip) = forwarded.or(peer) {
        req.extensions_mut().insert(ClientIp(ip));
    }

    next.run(req).await
}

/// First `X-Forwarded-For` entry, else `X-Real-IP`.
pub fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if let Some(xff) = header(X_FORWARDED_FOR) {
        return xff.split(',').next()?.trim().parse().ok();
    }
    header(X_REAL_IP)?.trim().parse().ok()
}
