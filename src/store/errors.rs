//! # Store Errors
//!
//! Error types for the document store module.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Seed file or directory could not be read
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// Seed data is not a list of JSON objects
    #[error("Invalid seed data in {path}: {message}")]
    InvalidSeed { path: String, message: String },

    /// A value could not be converted into a document
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Store lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    Poisoned,

    /// Backend-specific failure
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn io(path: impl Into<String>, err: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
