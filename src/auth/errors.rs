//! # Auth Errors
//!
//! Error types for the API-key gate.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Gate failures. Every variant denies the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Subscriber key or proxy secret header absent
    #[error("Access restricted to RapidAPI subscribers only.")]
    MissingCredentials,

    /// Proxy secret header does not match the configured secret.
    /// Worded like `MissingCredentials` so callers cannot probe the secret.
    #[error("Access restricted to RapidAPI subscribers only.")]
    ProxySecretMismatch,

    /// Key not found in the cache or the authorized set
    #[error("Invalid API key.")]
    InvalidApiKey,
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingCredentials => 403,
            AuthError::ProxySecretMismatch => 403,
            AuthError::InvalidApiKey => 403,
        }
    }

    /// Short reason for logs
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::ProxySecretMismatch => "proxy_secret_mismatch",
            AuthError::InvalidApiKey => "invalid_api_key",
        }
    }
}
