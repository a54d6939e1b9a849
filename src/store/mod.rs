//! # Document Store Module
//!
//! The storage collaborator behind the data endpoints. A store receives a
//! compiled [`QueryPlan`] and returns the matching documents restricted to
//! the projected fields.

pub mod config;
pub mod database;
pub mod document;
pub mod errors;
pub mod memory;

use async_trait::async_trait;

use crate::query::QueryPlan;

pub use config::DatabaseConfig;
pub use database::Database;
pub use document::{document_from_json, Document, FieldValue};
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;

/// Sort direction, encoded as `1` / `-1` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parse the numeric `sort_order` convention
    pub fn from_order(order: i64) -> Option<Self> {
        match order {
            1 => Some(SortDirection::Ascending),
            -1 => Some(SortDirection::Descending),
            _ => None,
        }
    }

    pub fn as_order(&self) -> i64 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

/// Single-field sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Pagination and ordering for a find
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindOptions {
    pub skip: usize,
    pub limit: usize,
    pub sort: Option<SortSpec>,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 50,
            sort: None,
        }
    }
}

/// Read access to a document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find documents in `collection` matching the plan's predicate.
    ///
    /// Results are sorted first, then `skip` and `limit` are applied, and
    /// each document is restricted to the plan's projection.
    async fn find(
        &self,
        collection: &str,
        plan: &QueryPlan,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>>;

    /// Release backend resources
    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}
