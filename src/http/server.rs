//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health and relay handlers
//! - Wire up middleware (request ID, tracing, CORS, panic recovery)
//! - Bind server to listener
//! - Drain on shutdown, bounded by the configured grace period

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::{CorsConfig, RelayConfig, SessionConfig, ValidationError};
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::http::response::panic_response;
use crate::relay::{relay_handler, UpstreamClient};
use crate::security::cors_layer;

pub const HEALTH_MESSAGE: &str = "SSE relay is running";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub session: SessionConfig,
}

/// Error building the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid CORS policy: {0}")]
    Cors(#[from] ValidationError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP server for the SSE relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, ServerError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        if upstream.policy().is_open() {
            tracing::warn!("No upstream host allow-list configured; scrtUrl may name any host");
        }

        let state = AppState {
            upstream: Arc::new(upstream),
            session: config.session.clone(),
        };

        let routes = Router::new()
            .route("/", get(health_handler))
            .route("/sse-proxy", get(relay_handler))
            .with_state(state);
        let router = Self::layered(&config.cors, routes)?;
        Ok(Self { router, config })
    }

    /// Wrap `routes` in the middleware stack.
    ///
    /// Trace spans carry the path only: the `/sse-proxy` query holds the
    /// access token.
    fn layered(cors: &CorsConfig, routes: Router) -> Result<Router, ServerError> {
        let middleware = ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(propagate_request_id_layer())
            .layer(cors_layer(cors)?)
            .layer(CatchPanicLayer::custom(panic_response));

        Ok(routes.layer(middleware))
    }

    /// The fully layered router, for in-process testing.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve until shutdown is signalled.
    ///
    /// After the signal the listener stops accepting and open connections get
    /// `shutdown_grace_secs` to finish. SSE sessions rarely finish on their
    /// own, so whatever is left after the grace period is abandoned to the
    /// runtime shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let grace = Duration::from_secs(self.config.listener.shutdown_grace_secs);
        let mut deadline = shutdown.resubscribe();

        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .into_future();

        tokio::select! {
            result = serve => result?,
            _ = async {
                let _ = deadline.recv().await;
                tokio::time::sleep(grace).await;
            } => {
                tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "Drain deadline elapsed, abandoning open sessions"
                );
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler() -> &'static str {
    HEALTH_MESSAGE
}
