//! Template compilation and rendering.

use arc_swap::{ArcSwap, ArcSwapOption};
use minijinja::value::{Value, ValueKind};
use minijinja::{AutoEscape, Environment, ErrorKind, Output, State};
use std::fmt::Write as _;
use std::sync::Arc;

use super::helpers::{self, Helpers};
use super::TemplateError;
use crate::config::{SiteConfig, SiteData};
use crate::files::{self, SiteFs};
use crate::observability::metrics;

/// Variables handed to a template, merged over `prod` and `config`.
pub type Env = serde_json::Map<String, serde_json::Value>;

/// An immutable set of compiled templates.
#[derive(Debug)]
pub struct Registry {
    env: Environment<'static>,
}

impl Registry {
    /// Execute the template `name` with `ctx`.
    pub fn render(&self, name: &str, ctx: Value) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|_| TemplateError::NotFound(name.to_string()))?;

        template.render(ctx).map_err(|source| TemplateError::Render {
            name: name.to_string(),
            source,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }
}

/// A page render bound to one registry snapshot and one context.
///
/// Layouts receive this as their `yield` helper: calling it renders the page
/// exactly as a direct render of the page would.
#[derive(Debug, Clone)]
pub struct PageRender {
    registry: Arc<Registry>,
    name: String,
    ctx: Value,
}

impl PageRender {
    pub fn render(&self) -> Result<String, TemplateError> {
        self.registry.render(&self.name, self.ctx.clone())
    }

    /// Wrap as a callable template value.
    fn into_value(self) -> Value {
        Value::from_function(move || -> Result<Value, minijinja::Error> {
            self.render().map(Value::from_safe_string).map_err(|e| {
                minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, "yield failed").with_source(e)
            })
        })
    }
}

/// Compiles the site's templates and renders them.
#[derive(Debug)]
pub struct TemplateEngine {
    config: Arc<SiteConfig>,
    data: SiteData,
    fs: Arc<dyn SiteFs>,
    helpers: ArcSwap<Helpers>,
    registry: ArcSwapOption<Registry>,
}

impl TemplateEngine {
    pub fn new(config: Arc<SiteConfig>, fs: Arc<dyn SiteFs>) -> Self {
        Self {
            config,
            data: SiteData::new(),
            fs,
            helpers: ArcSwap::from_pointee(helpers::builtin()),
            registry: ArcSwapOption::empty(),
        }
    }

    /// Merge additional helpers and drop the compiled registry.
    ///
    /// The next render recompiles, so the helpers are visible in every
    /// template, layouts included.
    pub fn register_functions(&self, additional: Helpers) {
        self.helpers.rcu(|current| {
            let mut merged = Helpers::clone(current);
            merged.extend(additional.iter().map(|(k, v)| (k.clone(), v.clone())));
            merged
        });
        self.registry.store(None);
    }

    /// Compile every page and backend template under the site root.
    ///
    /// On failure the previously installed registry stays in place.
    pub fn compile(&self) -> Result<Arc<Registry>, TemplateError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_formatter(format_value);

        for (name, value) in self.helpers.load().iter() {
            env.add_global(name.clone(), value.clone());
        }

        let frontend_ext = self.config.frontend_ext();
        let backend_ext = self.config.backend_ext();
        let mut count = 0;

        for rel in self.fs.walk().map_err(TemplateError::Walk)? {
            let ext = files::extension(&rel);
            if ext != frontend_ext && ext != backend_ext {
                continue;
            }

            let name = template_name(&rel);
            let bytes = self.fs.read(&rel).map_err(|source| TemplateError::Read {
                path: rel.clone(),
                source,
            })?;
            let source = String::from_utf8(bytes).map_err(|_| TemplateError::Encoding(rel.clone()))?;

            env.add_template_owned(name.clone(), source)
                .map_err(|source| TemplateError::Compile { name, source })?;
            count += 1;
        }

        tracing::debug!(templates = count, "Compiled templates");

        let registry = Arc::new(Registry { env });
        self.registry.store(Some(Arc::clone(&registry)));
        Ok(registry)
    }

    /// The registry to render against, compiling when required.
    fn registry(&self) -> Result<Arc<Registry>, TemplateError> {
        match self.registry.load_full() {
            Some(registry) if self.config.prod => Ok(registry),
            _ => self.compile(),
        }
    }

    /// Render a template by logical name or path.
    pub fn render(&self, file: &str, data: Env) -> Result<Vec<u8>, TemplateError> {
        let result = self.render_inner(file, data);
        metrics::record_render(if result.is_ok() { "ok" } else { "error" });
        result
    }

    fn render_inner(&self, file: &str, data: Env) -> Result<Vec<u8>, TemplateError> {
        let registry = self.registry()?;
        let name = template_name(file);
        let env = self.environment(data);

        let output = match self.config.layout() {
            Some(layout) => {
                let page = PageRender {
                    registry: Arc::clone(&registry),
                    name,
                    ctx: Value::from_serialize(&env),
                };
                let mut ctx = env
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_serialize(v)))
                    .collect::<std::collections::BTreeMap<_, _>>();
                ctx.insert("yield".to_string(), page.into_value());
                registry.render(&layout, Value::from(ctx))?
            }
            None => registry.render(&name, Value::from_serialize(&env))?,
        };

        Ok(output.into_bytes())
    }

    /// Caller data merged over the engine's own variables.
    fn environment(&self, data: Env) -> Env {
        let mut env = Env::new();
        env.insert("prod".into(), self.config.prod.into());
        env.insert("config".into(), self.data.get(&self.config));
        env.extend(data);
        env
    }

    /// Whether `rel` names an existing file under the site root.
    pub fn has_file(&self, rel: &str) -> bool {
        let rel = files::clean(rel);
        !rel.split('/').any(|s| s == "..") && self.fs.is_file(&rel)
    }

    /// Render the page for a request path, or `None` when it is not a page.
    ///
    /// `/` maps to `index.html`, `/about/` to `about/index.html`, and
    /// extension-less paths are tried with the page extension.
    pub fn handle_request(&self, path: &str) -> Option<Result<Vec<u8>, TemplateError>> {
        let file = expand_path(path);
        if self.skip_path(&file) {
            return None;
        }
        Some(self.render(&file, Env::new()))
    }

    fn skip_path(&self, file: &str) -> bool {
        let page_ext = self.config.frontend_ext();
        match files::extension(file) {
            "" => !self.has_file(&format!("{}{}", file, page_ext)),
            ext if ext == page_ext => !self.has_file(file),
            _ => true,
        }
    }
}

/// Booleans print as `true`/`false`; everything else is HTML-escaped.
fn format_value(out: &mut Output<'_>, state: &State<'_, '_>, value: &Value) -> Result<(), minijinja::Error> {
    if value.kind() == ValueKind::Bool {
        let text = if value.is_true() { "true" } else { "false" };
        return out
            .write_str(text)
            .map_err(|e| minijinja::Error::new(ErrorKind::WriteFailure, "output failed").with_source(e));
    }
    minijinja::escape_formatter(out, state, value)
}

/// Request path with directory requests pointed at their index page.
pub fn expand_path(path: &str) -> String {
    if path.ends_with('/') {
        format!("{}index.html", path)
    } else {
        path.to_string()
    }
}

/// Logical template name: extension stripped, `/` separators, no leading `/`.
pub fn template_name(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    files::strip_extension(&normalized)
        .trim_start_matches('/')
        .to_string()
}
