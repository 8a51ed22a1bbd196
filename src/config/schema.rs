//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use url::Url;

use crate::files;

/// Front-end address used when none (or an invalid one) is configured.
pub const DEFAULT_FRONTEND: &str = "http://localhost:8000/";

/// Root configuration for a site.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Public address of the site, e.g. `http://localhost:8000/app/` or `:8000`.
    pub frontend: String,

    /// Base URL of the JSON backend. Empty disables the proxy.
    pub backend: String,

    /// Site root directory holding templates and assets.
    pub dir: String,

    /// JSON data files exposed to templates as `config.<file name>`.
    pub json: Vec<String>,

    /// Layout template wrapping every rendered page.
    pub layout: String,

    /// Basic auth patterns, `user:pass@path`.
    pub auth: Vec<String>,

    /// Trust `X-Real-IP` / `X-Forwarded-For` from a fronting proxy.
    pub proxy: bool,

    /// Production mode: compile and bundle once, cache everything.
    pub prod: bool,

    /// Verbose logging.
    pub debug: bool,

    /// Deadline for one backend round trip, in seconds.
    pub backend_timeout_secs: u64,

    /// Optional Prometheus scrape address, e.g. `127.0.0.1:9090`.
    pub metrics_address: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            frontend: String::new(),
            backend: String::new(),
            dir: ".".to_string(),
            json: Vec::new(),
            layout: String::new(),
            auth: Vec::new(),
            proxy: false,
            prod: false,
            debug: false,
            backend_timeout_secs: 30,
            metrics_address: None,
        }
    }
}

impl SiteConfig {
    /// Normalized front-end URL, always ending in `/`.
    pub fn frontend_url(&self) -> String {
        normalize_address(&self.frontend).unwrap_or_else(|| DEFAULT_FRONTEND.to_string())
    }

    /// Normalized backend URL, always ending in `/`.
    pub fn backend_url(&self) -> Option<String> {
        normalize_address(&self.backend)
    }

    /// Extension of directly served page templates.
    pub fn frontend_ext(&self) -> &'static str {
        ".html"
    }

    /// Extension of backend decoration templates.
    pub fn backend_ext(&self) -> &'static str {
        ".tmpl"
    }

    /// URL path the site is mounted under, without trailing slash.
    ///
    /// Empty when the site is served from `/`.
    pub fn frontend_path(&self) -> String {
        url_path(&self.frontend_url())
    }

    /// Logical name of the layout template, if one is configured.
    pub fn layout(&self) -> Option<String> {
        if self.layout.is_empty() {
            return None;
        }
        Some(files::clean(files::strip_extension(&self.layout)))
    }

    pub fn dir(&self) -> &Path {
        if self.dir.is_empty() {
            Path::new(".")
        } else {
            Path::new(&self.dir)
        }
    }

    /// Socket address to listen on, derived from the front-end port.
    pub fn listen_address(&self) -> Option<SocketAddr> {
        let url = Url::parse(&self.frontend_url()).ok()?;
        let port = url.port_or_known_default()?;
        Some(SocketAddr::from(([0, 0, 0, 0], port)))
    }
}

/// Normalize an address: `:8080` becomes `http://localhost:8080/`, a
/// trailing slash is enforced. Empty or scheme-less addresses yield `None`.
pub fn normalize_address(addr: &str) -> Option<String> {
    if addr.is_empty() {
        return None;
    }

    let addr = if addr.starts_with(':') {
        format!("http://localhost{}", addr)
    } else {
        addr.to_string()
    };

    if !addr.contains("://") || Url::parse(&addr).is_err() {
        return None;
    }

    Some(format!("{}/", addr.trim_end_matches('/')))
}

fn url_path(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) if url.path() != "/" => url.path().trim_end_matches('/').to_string(),
        _ => String::new(),
    }
}
