//! Security and cache-control headers.
//!
//! # Responsibilities
//! - Security response headers (`nosniff`, XSS filter)
//! - No-cache response headers
//! - Strip conditional request validators so no-cache responses are always full
//!
//! # Design Decisions
//! - Security headers never overwrite values set by a handler
//! - No-cache headers always overwrite

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

pub const X_XSS_PROTECTION: HeaderName = HeaderName::from_static("x-xss-protection");
pub const X_ACCEL_EXPIRES: HeaderName = HeaderName::from_static("x-accel-expires");

pub const NOSNIFF: HeaderValue = HeaderValue::from_static("nosniff");
pub const XSS_BLOCK: HeaderValue = HeaderValue::from_static("1; mode=block");

const EPOCH: &str = "Thu, 01 Jan 1970 00:00:00 UTC";

/// Request headers that would let a downstream handler answer 304.
const VALIDATORS: [HeaderName; 6] = [
    header::ETAG,
    header::IF_MODIFIED_SINCE,
    header::IF_MATCH,
    header::IF_NONE_MATCH,
    header::IF_RANGE,
    header::IF_UNMODIFIED_SINCE,
];

/// Remove conditional validators from a request.
pub fn strip_validators(headers: &mut HeaderMap) {
    for name in VALIDATORS {
        headers.remove(name);
    }
}

/// Mark a response as never cacheable.
pub fn apply_no_cache(headers: &mut HeaderMap) {
    headers.insert(header::EXPIRES, HeaderValue::from_static(EPOCH));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, private, max-age=0"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(X_ACCEL_EXPIRES, HeaderValue::from_static("0"));
}
