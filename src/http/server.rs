//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Dispatch requests: proxy prefixes first, then the route table
//! - Serve built assets when configured
//! - Swap proxy rules on config reload
//! - Graceful shutdown

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::DevConfig;
use crate::http::pages::{self, PageShell};
use crate::http::proxy::{ProxyError, ProxyTable};
use crate::http::request::{MakeRequestUuidV4, RequestIdExt};
use crate::lifecycle::shutdown::wait as wait_for_shutdown;
use crate::observability::metrics::{self, RequestKind};
use crate::routing::RouteTable;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub proxies: Arc<ArcSwap<ProxyTable>>,
    pub shell: Arc<PageShell>,
}

/// Development server for the product listing.
pub struct DevServer {
    router: Router,
    config: DevConfig,
    proxies: Arc<ArcSwap<ProxyTable>>,
}

impl DevServer {
    /// Create a new server from a configuration and the application's route table.
    pub fn new(config: DevConfig, routes: RouteTable) -> Result<Self, ProxyError> {
        let proxies = Arc::new(ArcSwap::from_pointee(ProxyTable::from_config(&config)?));

        let state = AppState {
            routes: Arc::new(routes),
            proxies: proxies.clone(),
            shell: Arc::new(PageShell::from_config(&config.server)),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            proxies,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DevConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch));

        if let Some(dir) = &config.server.assets_dir {
            router = router.nest_service("/assets", ServeDir::new(dir));
        }

        // One extra second so the upstream timeout answers 504 first
        let request_timeout = Duration::from_secs(config.timeouts.request_secs + 1);

        router
            .with_state(state)
            .layer(SetResponseHeaderLayer::if_not_present(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            ))
            .layer(RequestBodyLimitLayer::new(config.server.max_body_bytes))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &DevConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` replace the proxy rules.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<DevConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            proxies = self.config.proxy.len(),
            "Dev server starting"
        );

        tokio::spawn(apply_config_updates(
            self.proxies.clone(),
            self.config.bind_address(),
            config_updates,
            shutdown.resubscribe(),
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("Dev server stopped");
        Ok(())
    }
}

/// Swap the proxy table for every valid configuration received.
async fn apply_config_updates(
    proxies: Arc<ArcSwap<ProxyTable>>,
    bind_address: String,
    mut updates: mpsc::UnboundedReceiver<DevConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else { return };

                if config.bind_address() != bind_address {
                    tracing::warn!(
                        current = %bind_address,
                        requested = %config.bind_address(),
                        "Listener address changed, restart to apply"
                    );
                }

                match ProxyTable::from_config(&config) {
                    Ok(table) => {
                        tracing::info!(proxies = table.routes().len(), "Proxy rules reloaded");
                        proxies.store(Arc::new(table));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to apply reloaded config, keeping current proxy rules");
                    }
                }
            }
            _ = shutdown.recv() => return,
        }
    }
}

/// Main handler.
/// Forwards proxied prefixes, resolves everything else against the route table.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request.headers().request_id().to_string();
    let path = request.uri().path().to_string();

    let proxies = state.proxies.load_full();
    if let Some(route) = proxies.find(&path) {
        let response = route.forward(request, &request_id).await;
        metrics::record_request(RequestKind::Proxy, response.status().as_u16(), start_time);
        return response;
    }

    let method = request.method();
    if method != Method::GET && method != Method::HEAD {
        tracing::debug!(request_id = %request_id, method = %method, path = %path, "Method not allowed on page");
        metrics::record_request(RequestKind::Page, 405, start_time);
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET, HEAD")],
            "Method not allowed",
        )
            .into_response();
    }

    let resolution = state.routes.resolve(&path);
    tracing::debug!(request_id = %request_id, path = %path, resolution = ?resolution, "Page resolved");

    let response = pages::respond(
        &state.shell,
        &resolution,
        request.uri().query(),
        request.headers(),
    );
    metrics::record_request(RequestKind::Page, response.status().as_u16(), start_time);
    response
}
