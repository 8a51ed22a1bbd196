//! Forwarding to the backend and merging its JSON into templates.

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, HeaderName, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use std::time::Duration;

use super::indent::indent;
use super::ProxyError;
use crate::config::SiteConfig;
use crate::files;
use crate::http::response;
use crate::observability::metrics;
use crate::template::{Env, TemplateEngine, TemplateError};

/// Upper bound on a forwarded request body.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Client headers never forwarded to the backend.
///
/// Besides the hop-by-hop set: `Accept-Encoding`, since bodies are decoded
/// here as JSON, and `Authorization`, which carries the site's credentials.
const NOT_FORWARDED: [HeaderName; 11] = [
    header::ACCEPT_ENCODING,
    header::AUTHORIZATION,
    header::CONNECTION,
    header::HOST,
    header::CONTENT_LENGTH,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Forwards requests to the backend and decorates its responses.
#[derive(Debug, Clone)]
pub struct ProxyDecorator {
    backend: String,
    client: reqwest::Client,
    engine: Arc<TemplateEngine>,
    backend_ext: &'static str,
}

impl ProxyDecorator {
    /// Build a decorator for the configured backend, if there is one.
    pub fn new(config: &SiteConfig, engine: Arc<TemplateEngine>) -> Result<Option<Self>, ProxyError> {
        let Some(backend) = config.backend_url() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend_timeout_secs))
            .build()
            .map_err(ProxyError::Client)?;

        tracing::info!(backend = %backend, "Backend proxy enabled");

        Ok(Some(Self {
            backend,
            client,
            engine,
            backend_ext: config.backend_ext(),
        }))
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Proxy one request and produce the client response.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        match self.forward(request).await {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    ProxyError::Decorate(_) => tracing::warn!(error = %e, "Decoration failed"),
                    _ => tracing::error!(error = %e, backend = %self.backend, "Proxy request failed"),
                }
                e.into_response()
            }
        }
    }

    async fn forward(&self, request: Request<Body>) -> Result<Response, ProxyError> {
        let (parts, body) = request.into_parts();
        let path = parts.uri.path().to_string();
        let target = self.target(
            parts
                .uri
                .path_and_query()
                .map_or(path.as_str(), |pq| pq.as_str()),
        );

        let body = to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(ProxyError::RequestBody)?;

        tracing::debug!(method = %parts.method, target = %target, "Forwarding to backend");

        let upstream = self
            .client
            .request(parts.method, &target)
            .headers(forwarded_headers(&parts.headers))
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = upstream.status();
        metrics::record_backend(Some(status.as_u16()));

        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = upstream.bytes().await.map_err(transport_error)?;

        let decorator = self.clone();
        tokio::task::spawn_blocking(move || {
            decorator.decorate(&path, status, content_type.as_deref(), &bytes)
        })
        .await
        .map_err(|e| ProxyError::Decorate(TemplateError::Task(e.to_string())))?
    }

    /// Backend URL for a request URI; the query string is kept.
    pub fn target(&self, uri: &str) -> String {
        format!("{}{}", self.backend, uri.trim_start_matches('/'))
    }

    /// Backend template matching a request path.
    pub fn candidate(&self, path: &str) -> String {
        let rel = path.trim_start_matches('/');
        format!("{}{}", files::strip_extension(rel), self.backend_ext)
    }

    /// Turn a backend response into the client response.
    pub fn decorate(
        &self,
        path: &str,
        status: StatusCode,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<Response, ProxyError> {
        let template = self.candidate(path);

        if !self.engine.has_file(&template) {
            return Ok(passthrough(status, content_type, body));
        }

        let env: Env = serde_json::from_slice(body).map_err(TemplateError::from)?;
        let html = self.engine.render(&template, env)?;

        Ok(response::html(status, html))
    }
}

/// JSON bodies are re-indented; anything else is returned as received.
fn passthrough(status: StatusCode, content_type: Option<&str>, body: &[u8]) -> Response {
    match indent(body) {
        Some(pretty) => response::json(status, pretty),
        None => response::raw(status, content_type, body.to_vec()),
    }
}

fn forwarded_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = headers.clone();
    for name in NOT_FORWARDED {
        forwarded.remove(name);
    }
    forwarded
}

fn transport_error(e: reqwest::Error) -> ProxyError {
    metrics::record_backend(None);
    if e.is_timeout() {
        ProxyError::Timeout
    } else {
        ProxyError::Transport(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::MemFs;

    fn decorator() -> ProxyDecorator {
        let fs = Arc::new(MemFs::new());
        fs.insert("api/user.tmpl", "<h1>{{ name }}</h1>");
        fs.insert("index.html", "home");

        let config = SiteConfig {
            backend: "http://127.0.0.1:9/".into(),
            ..SiteConfig::default()
        };
        let engine = Arc::new(TemplateEngine::new(Arc::new(config.clone()), fs));
        ProxyDecorator::new(&config, engine).unwrap().unwrap()
    }

    async fn body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_disabled_without_backend() {
        let engine = Arc::new(TemplateEngine::new(
            Arc::new(SiteConfig::default()),
            Arc::new(MemFs::new()),
        ));
        assert!(ProxyDecorator::new(&SiteConfig::default(), engine).unwrap().is_none());
    }

    #[test]
    fn test_target_and_candidate() {
        let proxy = decorator();
        assert_eq!(proxy.target("/api/user?id=1"), "http://127.0.0.1:9/api/user?id=1");
        assert_eq!(proxy.candidate("/api/user.json"), "api/user.tmpl");
        assert_eq!(proxy.candidate("/api/user"), "api/user.tmpl");
    }

    #[test]
    fn test_forwarded_headers_drop_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "site".parse().unwrap());
        headers.insert(header::CONNECTION, "keep-alive".parse().unwrap());
        headers.insert(header::ACCEPT, "application/json".parse().unwrap());

        let forwarded = forwarded_headers(&headers);
        assert!(forwarded.get(header::HOST).is_none());
        assert!(forwarded.get(header::CONNECTION).is_none());
        assert_eq!(forwarded[header::ACCEPT], "application/json");
    }

    #[test]
    fn test_forwarded_headers_drop_encoding_and_credentials() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_ENCODING, "gzip, deflate, br".parse().unwrap());
        headers.insert(header::AUTHORIZATION, "Basic YWRtaW46c2VjcmV0".parse().unwrap());
        headers.insert(header::COOKIE, "session=1".parse().unwrap());

        let forwarded = forwarded_headers(&headers);
        assert!(forwarded.get(header::ACCEPT_ENCODING).is_none());
        assert!(forwarded.get(header::AUTHORIZATION).is_none());
        assert_eq!(forwarded[header::COOKIE], "session=1");
    }

    #[tokio::test]
    async fn test_decorate_keeps_backend_status() {
        let response = decorator()
            .decorate("/api/user", StatusCode::CREATED, None, br#"{"name":"Ada"}"#)
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], response::HTML);
        assert_eq!(body(response).await, "<h1>Ada</h1>");
    }

    #[tokio::test]
    async fn test_decorate_pretty_prints_without_template() {
        let response = decorator()
            .decorate("/api/other", StatusCode::OK, None, br#"{"a":1}"#)
            .unwrap();

        assert_eq!(response.headers()[header::CONTENT_TYPE], response::JSON);
        assert_eq!(body(response).await, "{\n  \"a\": 1\n}");
    }

    #[tokio::test]
    async fn test_decorate_keeps_json_text() {
        let response = decorator()
            .decorate("/api/other", StatusCode::OK, None, br#"{"big":12345678901234567890123,"d":1,"d":2}"#)
            .unwrap();

        assert_eq!(
            body(response).await,
            "{\n  \"big\": 12345678901234567890123,\n  \"d\": 1,\n  \"d\": 2\n}"
        );
    }

    #[tokio::test]
    async fn test_decorate_passes_through_non_json() {
        let response = decorator()
            .decorate("/api/other", StatusCode::ACCEPTED, Some("text/plain"), b"plain")
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(body(response).await, "plain");
    }

    #[test]
    fn test_decorate_malformed_json_is_not_found() {
        let err = decorator()
            .decorate("/api/user", StatusCode::OK, None, b"not json")
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
