//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the page handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Resolve the app by context path and dispatch
//! - Map dispatch outcomes to responses
//! - Redeploy on config updates, stop on shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::validation::validate_config;
use crate::config::{ConfigError, RouterConfig};
use crate::deployment::{AppRegistry, BuildError, Deployment};
use crate::observability::metrics;
use crate::routing::Dispatch;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AppRegistry>,
}

/// HTTP server for the page router.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    registry: Arc<AppRegistry>,
}

impl HttpServer {
    /// Create a new HTTP server, deploying every app in `config`.
    pub fn new(config: RouterConfig) -> Result<Self, BuildError> {
        let registry = Arc::new(AppRegistry::new(Deployment::from_config(&config)?));

        let state = AppState {
            registry: registry.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            registry,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(page_handler))
            .route("/{*path}", get(page_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.listener.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The axum router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The live app registry.
    pub fn registry(&self) -> Arc<AppRegistry> {
        self.registry.clone()
    }

    /// Get a reference to the config the server started with.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires.
    ///
    /// Every config received on `config_updates` is validated, built into a
    /// new deployment and swapped in; a config that fails either step is
    /// logged and the current deployment stays live.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RouterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let registry = self.registry.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                if let Err(errors) = validate_config(&config) {
                    let e = ConfigError::Validation(errors);
                    tracing::error!(error = %e, "Rejected config update, keeping current deployment");
                    continue;
                }
                match Deployment::from_config(&config) {
                    Ok(deployment) => registry.deploy(deployment),
                    Err(e) => {
                        tracing::error!(error = %e, "Redeploy failed, keeping current deployment");
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn redirect_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status)
        .ok()
        .filter(StatusCode::is_redirection)
        .unwrap_or(StatusCode::FOUND)
}

/// Resolves the app, dispatches, and maps the outcome.
async fn page_handler(State(state): State<AppState>, headers: HeaderMap, uri: Uri) -> Response {
    let start_time = Instant::now();
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    let path = uri.path();

    let deployment = state.registry.current();
    let Some((app, rest)) = deployment.route(path) else {
        tracing::warn!(request_id = %request_id, path = %path, "No app deployed for path");
        metrics::record_dispatch("none", "not_found", start_time);
        return not_found(path);
    };

    let outcome = match app.dispatch(rest, uri.query()) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(request_id = %request_id, app = %app.name(), path = %path, error = %e, "Render failed");
            metrics::record_dispatch(app.name(), "render_error", start_time);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Page rendering failed").into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        app = %app.name(),
        path = %path,
        outcome = outcome.label(),
        "Dispatched"
    );
    metrics::record_dispatch(app.name(), outcome.label(), start_time);

    match outcome {
        Dispatch::Rendered(page) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, page.content_type)], page.body).into_response()
        }
        Dispatch::Redirect { location } => {
            (redirect_status(deployment.redirect_status()), [(header::LOCATION, location)]).into_response()
        }
        Dispatch::NotFound { .. } => not_found(path),
    }
}

fn not_found(path: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("No page found for '{path}'")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, PageConfig};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn server(redirect_status: u16) -> HttpServer {
        let mut config = RouterConfig::default();
        config.dispatch.redirect_status = redirect_status;
        config.apps.push(AppConfig {
            name: "store".into(),
            context_path: "/store".into(),
            pages: vec![
                PageConfig::inline("/index", "home"),
                PageConfig::inline("/products/", "catalog"),
                PageConfig::inline("/products/{id}", "product {id}"),
            ],
        });
        HttpServer::new(config).unwrap()
    }

    async fn get(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_rendered_page() {
        let response = get(server(302).router(), "/store/products/42").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            crate::page::DEFAULT_CONTENT_TYPE
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"product 42");
    }

    #[tokio::test]
    async fn test_redirect_uses_configured_status() {
        let response = get(server(301).router(), "/store/products?page=2").await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "/store/products/?page=2");
    }

    #[tokio::test]
    async fn test_context_root_redirect() {
        let response = get(server(302).router(), "/store").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/store/");
    }

    #[tokio::test]
    async fn test_not_found() {
        let router = server(302).router();
        assert_eq!(get(router.clone(), "/store/nope/deeper").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get(router, "/elsewhere").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_redeploy_is_visible_to_next_request() {
        let server = server(302);
        let router = server.router();
        assert_eq!(get(router.clone(), "/store/about").await.status(), StatusCode::NOT_FOUND);

        let mut config = server.config().clone();
        config.apps[0].pages.push(PageConfig::inline("/about", "about"));
        server.registry().deploy(Deployment::from_config(&config).unwrap());

        assert_eq!(get(router, "/store/about").await.status(), StatusCode::OK);
    }

    #[test]
    fn test_redirect_status_falls_back_to_found() {
        assert_eq!(redirect_status(200), StatusCode::FOUND);
        assert_eq!(redirect_status(308), StatusCode::PERMANENT_REDIRECT);
    }
}
