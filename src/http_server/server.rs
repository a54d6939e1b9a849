//! # HTTP Server
//!
//! Main HTTP server combining the health, dataset and metrics routers under
//! `/api/v1`. Every route except health sits behind the API-key gate.

use std::future::Future;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{require_api_key, AuthGate};
use crate::observability::{Event, MetricsRegistry};
use crate::store::Database;

use super::config::HttpServerConfig;
use super::data_routes::data_routes;
use super::observability_routes::{health_routes, metrics_routes};

/// Prefix for every route
pub const API_PREFIX: &str = "/api/v1";

/// Shared handler state
pub struct AppState {
    pub database: Database,
    pub gate: Arc<AuthGate>,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(database: Database, gate: AuthGate, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            database,
            gate: Arc::new(gate),
            metrics,
        }
    }
}

/// HTTP server for the statistics API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: Arc<AppState>) -> Self {
        let router = build_router(&config, state);
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        let addr = listener.local_addr()?;

        tracing::info!(event = %Event::Serving, addr = %addr, prefix = API_PREFIX, "Serving");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

/// Build the combined router with all endpoints
pub fn build_router(config: &HttpServerConfig, state: Arc<AppState>) -> Router {
    // Configure CORS from config
    let cors = if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let gated = Router::new()
        .merge(data_routes())
        .merge(metrics_routes())
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            require_api_key,
        ))
        .with_state(state);

    let api = Router::new().merge(health_routes()).merge(gated);

    Router::new()
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Resolves on Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!(event = %Event::ShutdownStart, "Shutdown signal received");
}
