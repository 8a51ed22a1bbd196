//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: bundle route, custom routes and the stage
//!   pipeline fallback
//! - Wire up middleware (recovery, request ID, tracing, real IP, prefix
//!   strip, security headers, ignore filter, basic auth, user layers)
//! - Bind server to listener and serve until shutdown
//!
//! # Design Decisions
//! - URI-rewriting middlewares wrap the routes router as a service, so
//!   dispatch sees the rewritten path
//! - Security headers sit inside the prefix strip: requests outside the
//!   site's path get a bare 404
//! - User layers wrap custom routes and page stages alike
//! - Recovery is outermost: a panic anywhere becomes a 500

use axum::{
    extract::Request,
    handler::Handler,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, MethodRouter, Route},
    Router,
};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::{Layer, Service, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use super::middleware;
use super::pipeline::{run_pipeline, NotFoundHandler};
use super::request::MakeRequestUuid;
use super::response;
use super::static_files::serve_bundle;
use crate::security::access_control::AuthRules;
use crate::security::headers::{NOSNIFF, XSS_BLOCK, X_XSS_PROTECTION};
use crate::site::Site;
use axum::http::header::X_CONTENT_TYPE_OPTIONS;

/// Application state injected into handlers and middlewares.
#[derive(Debug, Clone)]
pub struct AppState {
    pub site: Arc<Site>,
    pub auth: Arc<AuthRules>,
    pub not_found: Option<NotFoundHandler>,
}

type RouterLayer = Box<dyn FnOnce(Router<AppState>) -> Router<AppState> + Send>;

/// HTTP server for a site.
///
/// Custom routes, layers and the 404 handler are added builder-style before
/// [`HttpServer::run`].
pub struct HttpServer {
    state: AppState,
    routes: Router<AppState>,
    layers: Vec<RouterLayer>,
}

impl HttpServer {
    pub fn new(site: Arc<Site>) -> Self {
        let auth = Arc::new(AuthRules::from_patterns(&site.config().auth));
        Self {
            state: AppState {
                site,
                auth,
                not_found: None,
            },
            routes: Router::new(),
            layers: Vec::new(),
        }
    }

    /// Add a route, dispatched after basic auth and before the page stages.
    ///
    /// Path parameters use Axum syntax: `/users/{id}`, `/files/{*rest}`.
    pub fn route(mut self, path: &str, method_router: MethodRouter<AppState>) -> Self {
        self.routes = self.routes.route(path, method_router);
        self
    }

    /// Add a GET route answering with a redirect to `to`.
    pub fn redirect(self, from: &str, to: &str, code: StatusCode) -> Self {
        let to = to.to_string();
        self.route(
            from,
            get(move || {
                let to = to.clone();
                async move { response::redirect(code, &to) }
            }),
        )
    }

    /// Wrap custom routes and page stages in `layer`.
    ///
    /// Layers run after the built-in request middlewares; the first one added
    /// is the innermost.
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        self.layers.push(Box::new(move |router| router.layer(layer)));
        self
    }

    /// Answer requests no stage handles with `handler` instead of a plain 404.
    pub fn not_found<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.state.not_found = Some(NotFoundHandler::new(handler));
        self
    }

    /// Build the Axum router with all middleware layers.
    pub fn into_router(self) -> Router {
        let state = self.state;
        let bundles = format!("{}{{file}}", state.site.assets().bundle_prefix());

        let mut routes = self
            .routes
            .route(&bundles, get(serve_bundle))
            .fallback(run_pipeline);
        for apply in self.layers {
            routes = apply(routes);
        }
        let routes = routes.with_state(state.clone());

        let site = ServiceBuilder::new()
            .layer(from_fn_with_state(state.clone(), middleware::strip_prefix))
            .layer(SetResponseHeaderLayer::if_not_present(X_CONTENT_TYPE_OPTIONS, NOSNIFF))
            .layer(SetResponseHeaderLayer::if_not_present(X_XSS_PROTECTION, XSS_BLOCK))
            .layer(from_fn_with_state(state.clone(), middleware::ignore_filter))
            .layer(from_fn_with_state(state.clone(), middleware::basic_auth))
            .service(routes);

        Router::new()
            .fallback_service(site)
            .layer(from_fn_with_state(state, middleware::real_ip))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(CatchPanicLayer::new())
    }

    /// Run the server, accepting connections until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.into_router().into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
