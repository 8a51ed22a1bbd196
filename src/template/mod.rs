//! Template engine subsystem.
//!
//! # Data Flow
//! ```text
//! render(name, data)
//!     → engine.rs (compile when no registry or in development)
//!     → environment: {prod, config} merged under caller data
//!     → layout configured?
//!         yes: execute layout, `yield` = PageRender of the page
//!         no:  execute page
//!     → rendered bytes
//! ```
//!
//! # Design Decisions
//! - The registry is an immutable snapshot swapped atomically; in-flight
//!   renders keep the snapshot they started with
//! - Templates are compiled from every `.html` and `.tmpl` file, including
//!   underscore-prefixed partials and layouts that are never served directly
//! - Render errors map to 404: they usually mean "no such page"

pub mod engine;
pub mod helpers;

pub use engine::{expand_path, template_name, Env, PageRender, Registry, TemplateEngine};
pub use helpers::Helpers;

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while compiling or rendering templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to list templates: {0}")]
    Walk(#[source] std::io::Error),

    #[error("failed to read template {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("template {0} is not valid UTF-8")]
    Encoding(String),

    #[error("failed to compile template {name}: {source}")]
    Compile {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("no template named {0}")]
    NotFound(String),

    #[error("failed to render template {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("data is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),

    #[error("render task failed: {0}")]
    Task(String),
}

impl TemplateError {
    /// Status code reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            TemplateError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::NOT_FOUND,
        }
    }
}
