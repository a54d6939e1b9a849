//! Observability HTTP Routes
//!
//! Health check (ungated) and the counters snapshot (gated).

use std::sync::Arc;

use axum::extract::State;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use super::server::AppState;

/// Body of a healthy response
pub const HEALTH_OK: &str = "API Health OK";

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub detail: String,
}

/// Health check route, never gated
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

/// Metrics route
pub fn metrics_routes() -> Router<Arc<AppState>> {
    Router::new().route("/metrics", get(metrics_handler))
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        detail: HEALTH_OK.to_string(),
    };

    (StatusCode::OK, Json(response))
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.metrics.snapshot()))
}
