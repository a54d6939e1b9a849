//! # API Errors
//!
//! Every failure leaves the server as `{"detail": <message>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;
use crate::records::RecordError;
use crate::store::StoreError;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Message for an empty result set
pub const NO_RECORDS_MESSAGE: &str = "No records found for given filters";

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Query parameter failed to parse or is out of range
    #[error("Invalid query parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    /// Gate failure
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Query matched nothing
    #[error("No records found for given filters")]
    NotFound,

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Store failure
    #[error("Internal server error")]
    Store(#[from] StoreError),

    /// Stored document has the wrong shape
    #[error("Internal server error")]
    Record(#[from] RecordError),
}

impl ApiError {
    pub fn invalid_param(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ApiError::InvalidParam {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidParam { .. } => StatusCode::BAD_REQUEST,
            ApiError::Auth(auth_err) => {
                StatusCode::from_u16(auth_err.status_code()).unwrap_or(StatusCode::FORBIDDEN)
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Record(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
