//! # Database Handle
//!
//! Explicitly constructed connection handle. The server acquires it once at
//! start, shares it with request handlers, and releases it at shutdown.

use std::sync::Arc;

use crate::observability::Event;
use crate::query::QueryPlan;

use super::config::DatabaseConfig;
use super::document::Document;
use super::errors::StoreResult;
use super::memory::MemoryStore;
use super::{DocumentStore, FindOptions};

#[derive(Clone)]
pub struct Database {
    name: String,
    store: Arc<dyn DocumentStore>,
}

impl Database {
    /// Open the bundled store from the configured data directory
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let store = MemoryStore::load_dir(&config.data_dir)?;
        let collections = store.collection_names()?;

        tracing::info!(
            event = %Event::DatabaseConnected,
            database = %config.name,
            data_dir = %config.data_dir.display(),
            collections = collections.len(),
            "Connected to database"
        );

        Ok(Self::with_store(config.name.clone(), Arc::new(store)))
    }

    /// Wrap an existing store
    pub fn with_store(name: impl Into<String>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn find(
        &self,
        collection: &str,
        plan: &QueryPlan,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        self.store.find(collection, plan, options).await
    }

    /// Release the underlying store
    pub async fn close(self) -> StoreResult<()> {
        self.store.close().await?;
        tracing::info!(event = %Event::DatabaseClosed, database = %self.name, "Database connection closed");
        Ok(())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("name", &self.name).finish()
    }
}
