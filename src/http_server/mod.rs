//! # HTTP Server Module
//!
//! Axum server exposing the statistics API.
//!
//! # Endpoints
//!
//! - `/api/v1/health` - Health check
//! - `/api/v1/economic` - Economic and social indicators
//! - `/api/v1/electricity` - Electricity indicators
//! - `/api/v1/metrics` - Gate and query counters

pub mod config;
pub mod data_routes;
pub mod errors;
pub mod observability_routes;
pub mod params;
pub mod server;

pub use config::HttpServerConfig;
pub use data_routes::query_dataset;
pub use errors::{ApiError, ApiResult, ErrorResponse, NO_RECORDS_MESSAGE};
pub use observability_routes::HEALTH_OK;
pub use params::{DataQuery, DEFAULT_LIMIT, MAX_LIMIT};
pub use server::{build_router, shutdown_signal, AppState, HttpServer, API_PREFIX};
