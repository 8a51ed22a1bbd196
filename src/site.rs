//! The assembled site: configuration, files, assets, templates and proxy.
//!
//! # Responsibilities
//! - Wire the asset helpers into the template engine
//! - Expose rendering and helper registration to library users
//! - Hand the HTTP layer everything a request stage needs

use axum::http::StatusCode;
use axum::response::Response;
use std::sync::Arc;

use crate::assets::AssetPipeline;
use crate::config::SiteConfig;
use crate::files::{DiskFs, SiteFs};
use crate::http::response;
use crate::proxy::{ProxyDecorator, ProxyError};
use crate::template::{helpers, Env, Helpers, TemplateEngine, TemplateError};

#[derive(Debug)]
pub struct Site {
    config: Arc<SiteConfig>,
    fs: Arc<dyn SiteFs>,
    assets: Arc<AssetPipeline>,
    engine: Arc<TemplateEngine>,
    proxy: Option<ProxyDecorator>,
}

impl Site {
    /// A site served from the configured directory.
    pub fn new(config: SiteConfig) -> Result<Self, ProxyError> {
        let fs = Arc::new(DiskFs::new(config.dir()));
        Self::with_fs(config, fs)
    }

    /// A site served from any file source.
    pub fn with_fs(config: SiteConfig, fs: Arc<dyn SiteFs>) -> Result<Self, ProxyError> {
        let config = Arc::new(config);

        let assets = Arc::new(AssetPipeline::new(
            Arc::clone(&fs),
            config.prod,
            config.frontend_path(),
        ));

        let engine = Arc::new(TemplateEngine::new(Arc::clone(&config), Arc::clone(&fs)));
        engine.register_functions(helpers::asset_helpers(Arc::clone(&assets)));

        if config.prod {
            if let Err(e) = engine.compile() {
                tracing::warn!(error = %e, "Initial template compile failed");
            }
        }

        let proxy = ProxyDecorator::new(&config, Arc::clone(&engine))?;

        Ok(Self {
            config,
            fs,
            assets,
            engine,
            proxy,
        })
    }

    /// Render a template by logical name or path into bytes.
    pub fn execute(&self, file: &str, env: Env) -> Result<Vec<u8>, TemplateError> {
        self.engine.render(file, env)
    }

    /// Render a template as an HTML response with `status`.
    ///
    /// Render failures are logged and answered with 404, like page requests.
    /// Rendering blocks; call from `spawn_blocking` for large templates.
    pub fn respond(&self, status: StatusCode, file: &str, env: Env) -> Response {
        match self.engine.render(file, env) {
            Ok(bytes) => response::html(status, bytes),
            Err(e) => {
                tracing::warn!(file = %file, error = %e, "Template render failed");
                response::status(e.status())
            }
        }
    }

    /// Add helpers to every template, replacing same-named ones.
    pub fn register_functions(&self, additional: Helpers) {
        self.engine.register_functions(additional);
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn fs(&self) -> &Arc<dyn SiteFs> {
        &self.fs
    }

    pub fn assets(&self) -> &Arc<AssetPipeline> {
        &self.assets
    }

    pub fn engine(&self) -> &Arc<TemplateEngine> {
        &self.engine
    }

    pub fn proxy(&self) -> Option<&ProxyDecorator> {
        self.proxy.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::MemFs;
    use minijinja::value::Value;
    use serde_json::json;

    fn site(prod: bool) -> (Site, Arc<MemFs>) {
        let fs = Arc::new(MemFs::new());
        fs.insert("index.html", "{{ css('/css') }}{{ js('js') }}");
        fs.insert("css/site.css", "body{}");
        fs.insert("js/app.js", "app();");
        fs.insert("note.html", "{{ md('notes/a.md') }}");
        fs.insert("notes/a.md", "*hi*");

        let config = SiteConfig {
            prod,
            ..SiteConfig::default()
        };
        (Site::with_fs(config, fs.clone()).unwrap(), fs)
    }

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_development_links_assets() {
        let (site, _) = site(false);
        let out = text(site.execute("index", Env::new()).unwrap());
        assert_eq!(
            out,
            "<link rel=\"stylesheet\" href=\"/css/site.css\"><script src=\"js/app.js\"></script>"
        );
    }

    #[test]
    fn test_production_bundles_assets() {
        let (site, _) = site(true);
        let out = text(site.execute("index", Env::new()).unwrap());
        let prefix = site.assets().bundle_prefix();

        assert!(out.starts_with(&format!("<link rel=\"stylesheet\" href=\"{}", prefix)));
        assert!(out.contains(&format!("<script src=\"{}", prefix.trim_start_matches('/'))));
    }

    #[test]
    fn test_markdown_helper_is_not_escaped() {
        let (site, _) = site(false);
        let out = text(site.execute("note", Env::new()).unwrap());
        assert_eq!(out, "<div class=\"md\" id=\"notes/a.md\"><p><em>hi</em></p>\n</div>");
    }

    #[test]
    fn test_respond() {
        let (site, fs) = site(false);
        fs.insert("created.html", "made {{ what }}");

        let env = json!({"what": "it"}).as_object().cloned().unwrap();
        let ok = site.respond(StatusCode::CREATED, "created", env);
        assert_eq!(ok.status(), StatusCode::CREATED);
        assert_eq!(ok.headers()[axum::http::header::CONTENT_TYPE], response::HTML);

        let missing = site.respond(StatusCode::OK, "missing", Env::new());
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_register_functions() {
        let (site, fs) = site(true);
        fs.insert("custom.html", "{{ greet(name) }}");

        let mut extra = Helpers::new();
        extra.insert(
            "greet".into(),
            Value::from_function(|name: String| format!("hello {}", name)),
        );
        site.register_functions(extra);

        let env = json!({"name": "ada"}).as_object().cloned().unwrap();
        assert_eq!(text(site.execute("custom", env).unwrap()), "hello ada");
    }
}
