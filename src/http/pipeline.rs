//! Ordered request stages after route dispatch.
//!
//! # Data Flow
//! ```text
//! production:   templates → static → no-cache → proxy → 404
//! development:  no-cache → templates → static → proxy → 404
//! ```
//!
//! The first stage producing a response wins. Once the no-cache stage has
//! run, every later response carries no-cache headers. The terminal 404 can
//! be replaced with a [`NotFoundHandler`].

use axum::{
    extract::{Request, State},
    handler::Handler,
    http::{Method, StatusCode},
    response::Response,
};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use super::middleware::ClientIp;
use super::request::request_id;
use super::response;
use super::server::AppState;
use super::static_files;
use crate::observability::metrics;
use crate::security::headers::{apply_no_cache, strip_validators};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NoCache,
    Templates,
    Static,
    Proxy,
    NotFound,
}

const PRODUCTION: [Stage; 5] = [
    Stage::Templates,
    Stage::Static,
    Stage::NoCache,
    Stage::Proxy,
    Stage::NotFound,
];

const DEVELOPMENT: [Stage; 5] = [
    Stage::NoCache,
    Stage::Templates,
    Stage::Static,
    Stage::Proxy,
    Stage::NotFound,
];

impl Stage {
    /// Stage order for the environment.
    pub fn order(prod: bool) -> &'static [Stage] {
        if prod {
            &PRODUCTION
        } else {
            &DEVELOPMENT
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::NoCache => "nocache",
            Stage::Templates => "templates",
            Stage::Static => "static",
            Stage::Proxy => "proxy",
            Stage::NotFound => "notfound",
        }
    }
}

type BoxResponse = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Replacement for the terminal 404 stage.
#[derive(Clone)]
pub struct NotFoundHandler(Arc<dyn Fn(Request) -> BoxResponse + Send + Sync>);

impl NotFoundHandler {
    pub fn new<H, T>(handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self(Arc::new(move |req| Box::pin(handler.clone().call(req, ()))))
    }

    async fn call(&self, req: Request) -> Response {
        (self.0)(req).await
    }
}

impl fmt::Debug for NotFoundHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NotFoundHandler")
    }
}

/// Run the request through the stages until one responds.
pub async fn run_pipeline(State(state): State<AppState>, mut req: Request) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let mut no_cache = false;

    tracing::debug!(
        request_id = %request_id(req.headers()),
        method = %method,
        path = %req.uri().path(),
        client = ?req.extensions().get::<ClientIp>().map(|ip| ip.0),
        "Dispatching request"
    );

    for &stage in Stage::order(state.site.config().prod) {
        let outcome = match stage {
            Stage::NoCache => {
                no_cache = true;
                strip_validators(req.headers_mut());
                None
            }
            Stage::Templates => {
                let path = req.uri().path();
                templates(&state, &method, path).await
            }
            Stage::Static => {
                let (path, headers) = (req.uri().path(), req.headers());
                static_files::serve(&state.site, &method, path, headers).await
            }
            Stage::Proxy => match state.site.proxy() {
                Some(proxy) => Some(proxy.handle(std::mem::take(&mut req)).await),
                None => None,
            },
            Stage::NotFound => Some(match &state.not_found {
                Some(handler) => handler.call(std::mem::take(&mut req)).await,
                None => response::not_found(),
            }),
        };

        if let Some(mut response) = outcome {
            if no_cache {
                apply_no_cache(response.headers_mut());
            }
            metrics::record_request(method.as_str(), response.status().as_u16(), stage.name(), start);
            return response;
        }
    }

    response::not_found()
}

/// Render the page template for a GET request, if the path names one.
async fn templates(state: &AppState, method: &Method, path: &str) -> Option<Response> {
    if method != Method::GET {
        return None;
    }

    let engine = state.site.engine().clone();
    let owned = path.to_string();

    let rendered = match tokio::task::spawn_blocking(move || engine.handle_request(&owned)).await {
        Ok(rendered) => rendered?,
        Err(e) => {
            tracing::error!(error = %e, "Render task failed");
            return Some(response::status(StatusCode::INTERNAL_SERVER_ERROR));
        }
    };

    Some(match rendered {
        Ok(bytes) => response::html(StatusCode::OK, bytes),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Template render failed");
            response::status(e.status())
        }
    })
}
