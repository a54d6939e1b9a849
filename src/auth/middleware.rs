//! # API Key Gate
//!
//! Axum middleware guarding every data route. A request passes when it
//! carries both RapidAPI headers, the proxy secret matches (if one is
//! configured) and the subscriber key verifies.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use crate::http_server::ApiError;
use crate::observability::{Event, MetricsRegistry};

use super::errors::{AuthError, AuthResult};
use super::verifier::{redact, KeyVerifier, Verification};

/// Subscriber key header
pub const API_KEY_HEADER: &str = "x-rapidapi-key";

/// Marketplace proxy secret header
pub const PROXY_SECRET_HEADER: &str = "x-rapidapi-proxy-secret";

/// Response header set on verified requests
pub const AUTH_STATUS_HEADER: &str = "x-auth-status";

/// Value of [`AUTH_STATUS_HEADER`]
pub const AUTH_STATUS_VERIFIED: &str = "Verified via RapidAPI";

pub struct AuthGate {
    verifier: KeyVerifier,
    proxy_secret: Option<String>,
    metrics: Arc<MetricsRegistry>,
}

impl AuthGate {
    pub fn new(
        verifier: KeyVerifier,
        proxy_secret: Option<String>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            verifier,
            proxy_secret: proxy_secret.filter(|s| !s.is_empty()),
            metrics,
        }
    }

    /// Decide whether the headers grant access
    pub async fn check(&self, headers: &HeaderMap) -> AuthResult<Verification> {
        let key = header_value(headers, API_KEY_HEADER);
        let secret = header_value(headers, PROXY_SECRET_HEADER);

        let (Some(key), Some(secret)) = (key, secret) else {
            return Err(AuthError::MissingCredentials);
        };

        if let Some(expected) = &self.proxy_secret {
            let matches: bool = secret.as_bytes().ct_eq(expected.as_bytes()).into();
            if !matches {
                return Err(AuthError::ProxySecretMismatch);
            }
        }

        match self.verifier.check(key).await {
            Verification::Rejected => Err(AuthError::InvalidApiKey),
            accepted => Ok(accepted),
        }
    }
}

/// Non-empty UTF-8 header value
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Middleware entry point, installed with `axum::middleware::from_fn_with_state`
pub async fn require_api_key(
    State(gate): State<Arc<AuthGate>>,
    request: Request,
    next: Next,
) -> Response {
    match gate.check(request.headers()).await {
        Ok(_) => {
            let mut response = next.run(request).await;
            response.headers_mut().insert(
                AUTH_STATUS_HEADER,
                HeaderValue::from_static(AUTH_STATUS_VERIFIED),
            );
            response
        }
        Err(e) => {
            let key = header_value(request.headers(), API_KEY_HEADER)
                .map(redact)
                .unwrap_or_default();
            tracing::info!(
                event = %Event::RequestDenied,
                reason = e.reason(),
                key = %key,
                path = %request.uri().path(),
                "Request denied"
            );
            gate.metrics.increment_requests_denied();
            ApiError::from(e).into_response()
        }
    }
}
