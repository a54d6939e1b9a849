//! # Cache Errors

use thiserror::Error;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache collaborator errors. None of these are fatal to a request.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// URL could not be parsed or uses an unsupported scheme
    #[error("Invalid cache URL: {0}")]
    InvalidUrl(String),

    /// Connection could not be established
    #[error("Cache connection failed: {0}")]
    Connect(String),

    /// Operation exceeded its deadline
    #[error("Cache operation timed out after {0}ms")]
    Timeout(u64),

    /// Server recently failed and is not being contacted
    #[error("Cache unavailable, retrying in {0}ms")]
    Unavailable(u64),

    /// Socket read or write failed
    #[error("Cache I/O error: {0}")]
    Io(String),

    /// Reply could not be decoded
    #[error("Cache protocol error: {0}")]
    Protocol(String),

    /// Server answered with an error reply
    #[error("Cache server error: {0}")]
    Server(String),

    /// Internal lock was poisoned
    #[error("Cache lock poisoned")]
    Poisoned,
}

impl From<std::io::Error> for CacheError {
    fn from(e: std::io::Error) -> Self {
        CacheError::Io(e.to_string())
    }
}
