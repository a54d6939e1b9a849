//! # In-Memory Store
//!
//! Bundled [`DocumentStore`] holding collections in memory. Collections can
//! be seeded from a directory of `<collection>.json` files, each a JSON
//! array of objects.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::query::QueryPlan;

use super::document::{document_from_json, Document, FieldValue};
use super::errors::{StoreError, StoreResult};
use super::{DocumentStore, FindOptions, SortDirection, SortSpec};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` file in `dir` as a collection named after the
    /// file stem. A missing directory yields an empty store.
    pub fn load_dir(dir: &Path) -> StoreResult<Self> {
        let store = Self::new();

        if !dir.exists() {
            return Ok(store);
        }

        let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir.display().to_string(), e))?;

        for entry in entries {
            let path = entry
                .map_err(|e| StoreError::io(dir.display().to_string(), e))?
                .path();

            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(collection) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let documents = read_seed_file(&path)?;
            store.insert_many(collection, documents)?;
        }

        Ok(store)
    }

    pub fn insert(&self, collection: &str, document: Document) -> StoreResult<()> {
        self.insert_many(collection, vec![document])
    }

    pub fn insert_many(&self, collection: &str, documents: Vec<Document>) -> StoreResult<()> {
        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned)?;
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        Ok(())
    }

    /// Names of all loaded collections, sorted
    pub fn collection_names(&self) -> StoreResult<Vec<String>> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    pub fn count(&self, collection: &str) -> StoreResult<usize> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;
        Ok(collections.get(collection).map_or(0, Vec::len))
    }
}

fn read_seed_file(path: &Path) -> StoreResult<Vec<Document>> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| StoreError::io(display.clone(), e))?;

    let invalid = |message: String| StoreError::InvalidSeed {
        path: display.clone(),
        message,
    };

    let value: Value = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(invalid("expected a JSON array of documents".to_string()));
    };

    items
        .into_iter()
        .map(|item| document_from_json(item).map_err(|e| invalid(e.to_string())))
        .collect()
}

fn sort_documents(documents: &mut [&Document], sort: &SortSpec) {
    documents.sort_by(|a, b| {
        let ordering = match (a.get(&sort.field), b.get(&sort.field)) {
            (None, None) => std::cmp::Ordering::Equal,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (Some(x), Some(y)) => FieldValue::sort_cmp(x, y),
        };

        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        plan: &QueryPlan,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Document> = documents
            .iter()
            .filter(|doc| plan.predicate().matches(doc))
            .collect();

        if let Some(sort) = &options.sort {
            sort_documents(&mut matched, sort);
        }

        Ok(matched
            .into_iter()
            .skip(options.skip)
            .take(options.limit)
            .map(|doc| plan.projection().apply(doc.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Dataset, FilterCriteria};
    use serde_json::json;

    fn doc(value: Value) -> Document {
        document_from_json(value).unwrap()
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_many(
                "electrical_collection",
                vec![
                    doc(json!({"_id": 1, "country": "Kenya", "metric": "Access to electricity", "2015": 41.6, "2016": 53.1})),
                    doc(json!({"_id": 2, "country": "Ghana", "metric": "Access to electricity", "2015": 75.7})),
                    doc(json!({"_id": 3, "country": "Kenyan Highlands", "metric": "Installed capacity", "2015": 2.3})),
                    doc(json!({"_id": 4, "country": "Egypt", "metric": "Installed capacity", "2016": 45.0})),
                ],
            )
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_find_filters_and_projects() {
        let store = seeded();
        let plan = Dataset::Electricity
            .compiler()
            .compile(&FilterCriteria::new().country("kenya").year(2015));

        let docs = store
            .find("electrical_collection", &plan, &FindOptions::default())
            .await
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["country"], FieldValue::Text("Kenya".into()));
        assert!(docs[0].contains_key("2015"));
        assert!(!docs[0].contains_key("2016"));
        assert!(!docs[0].contains_key("_id"));
    }

    #[tokio::test]
    async fn test_sort_then_skip_then_limit() {
        let store = seeded();
        let plan = Dataset::Electricity.compiler().compile(&FilterCriteria::new());
        let options = FindOptions {
            skip: 1,
            limit: 2,
            sort: Some(SortSpec {
                field: "country".to_string(),
                direction: SortDirection::Descending,
            }),
        };

        let docs = store
            .find("electrical_collection", &plan, &options)
            .await
            .unwrap();

        let countries: Vec<&str> = docs
            .iter()
            .map(|d| d["country"].as_str().unwrap())
            .collect();
        assert_eq!(countries, vec!["Kenya", "Ghana"]);
    }

    #[tokio::test]
    async fn test_unknown_collection_is_empty() {
        let store = seeded();
        let plan = Dataset::Economic.compiler().compile(&FilterCriteria::new());
        let docs = store
            .find("social_collection", &plan, &FindOptions::default())
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(
            dir.path().join("social_collection.json"),
            r#"[{"country": "Chad", "metric": "GDP"}, {"country": "Mali", "metric": "GDP"}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let store = MemoryStore::load_dir(dir.path()).unwrap();
        assert_eq!(store.collection_names().unwrap(), vec!["social_collection"]);
        assert_eq!(store.count("social_collection").unwrap(), 2);
    }

    #[test]
    fn test_load_dir_rejects_non_array_seed() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("social_collection.json"), r#"{"country": "Chad"}"#).unwrap();

        let result = MemoryStore::load_dir(dir.path());
        assert!(matches!(result, Err(StoreError::InvalidSeed { .. })));
    }

    #[test]
    fn test_missing_dir_is_empty_store() {
        let store = MemoryStore::load_dir(Path::new("/nonexistent/energy-data")).unwrap();
        assert!(store.collection_names().unwrap().is_empty());
    }
}
