//! # Auth Module
//!
//! API-key access control for the data routes.
//!
//! - [`KeyVerifier`]: cache-then-authorized-set lookup with write-through
//! - [`AuthGate`] and [`require_api_key`]: the header gate in front of every
//!   route except health

mod config;
mod errors;
mod keys;
mod middleware;
mod verifier;

pub use config::AuthConfig;
pub use errors::{AuthError, AuthResult};
pub use keys::{AuthorizedKeys, StaticKeySet};
pub use middleware::{
    require_api_key, AuthGate, API_KEY_HEADER, AUTH_STATUS_HEADER, AUTH_STATUS_VERIFIED,
    PROXY_SECRET_HEADER,
};
pub use verifier::{
    cache_key, redact, KeyVerifier, Verification, CACHE_KEY_PREFIX, VALID_SENTINEL,
    VERIFIED_KEY_TTL,
};
