//! # Projection
//!
//! The set of document fields requested from the store: the fixed metadata
//! fields plus a bounded list of year fields.

use serde_json::{Map, Value};

use crate::store::Document;

/// Metadata fields included in every projection
pub const METADATA_FIELDS: [&str; 9] = [
    "country",
    "country_serial",
    "metric",
    "unit",
    "sector",
    "sub_sector",
    "sub_sub_sector",
    "source_link",
    "source",
];

/// Internal record identifier, always excluded
pub const RECORD_ID_FIELD: &str = "_id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    year_fields: Vec<String>,
}

impl Projection {
    /// Metadata fields only
    pub fn metadata_only() -> Self {
        Self::default()
    }

    /// Metadata fields plus the given year fields
    pub fn with_year_fields(year_fields: Vec<String>) -> Self {
        Self { year_fields }
    }

    pub fn year_fields(&self) -> &[String] {
        &self.year_fields
    }

    /// All projected field names, metadata first
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        METADATA_FIELDS
            .iter()
            .copied()
            .chain(self.year_fields.iter().map(String::as_str))
    }

    pub fn includes(&self, field: &str) -> bool {
        field != RECORD_ID_FIELD && self.fields().any(|f| f == field)
    }

    /// Keep only projected fields of a document
    pub fn apply(&self, mut doc: Document) -> Document {
        doc.retain(|field, _| self.includes(field));
        doc
    }

    /// Render as a MongoDB-style projection document
    pub fn to_projection_document(&self) -> Value {
        let mut projection = Map::new();
        projection.insert(RECORD_ID_FIELD.to_string(), Value::from(0));
        for field in self.fields() {
            projection.insert(field.to_string(), Value::from(1));
        }
        Value::Object(projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::document_from_json;
    use serde_json::json;

    #[test]
    fn test_metadata_only_projection() {
        let projection = Projection::metadata_only();
        assert_eq!(projection.fields().count(), METADATA_FIELDS.len());
        assert!(projection.includes("country"));
        assert!(!projection.includes("2015"));
        assert!(!projection.includes(RECORD_ID_FIELD));
    }

    #[test]
    fn test_apply_drops_unprojected_fields() {
        let projection = Projection::with_year_fields(vec!["2015".into()]);
        let doc = document_from_json(json!({
            "_id": "abc",
            "country": "Ghana",
            "metric": "Access",
            "2014": 1,
            "2015": 2
        }))
        .unwrap();

        let projected = projection.apply(doc);
        let keys: Vec<&str> = projected.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2015", "country", "metric"]);
    }

    #[test]
    fn test_projection_document_excludes_id() {
        let projection = Projection::with_year_fields(vec!["2020".into()]);
        let rendered = projection.to_projection_document();
        assert_eq!(rendered["_id"], 0);
        assert_eq!(rendered["source_link"], 1);
        assert_eq!(rendered["2020"], 1);
        assert_eq!(rendered.as_object().unwrap().len(), 11);
    }
}
