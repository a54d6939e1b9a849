//! # Documents
//!
//! Raw documents as returned by a store: ordered field maps whose values may
//! hold non-finite floats until they are sanitized.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{StoreError, StoreResult};

/// A raw document: field name to value
pub type Document = BTreeMap<String, FieldValue>;

/// A document field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of ints and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Rank of the value's type in sort order
    fn type_rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Int(_) | FieldValue::Float(_) => 1,
            FieldValue::Text(_) => 2,
            FieldValue::Map(_) => 3,
            FieldValue::List(_) => 4,
            FieldValue::Bool(_) => 5,
        }
    }

    /// Total order used for sorting query results.
    ///
    /// Ordering rules:
    /// - null < numbers < text < map < list < bool
    /// - ints and floats compare numerically, NaN lowest
    /// - maps and lists of the same type compare equal
    pub fn sort_cmp(&self, other: &FieldValue) -> Ordering {
        let by_type = self.type_rank().cmp(&other.type_rank());
        if by_type != Ordering::Equal {
            return by_type;
        }

        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => match (x.is_nan(), y.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => x.total_cmp(&y),
                },
                _ => Ordering::Equal,
            },
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => FieldValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                FieldValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// Build a document from a JSON object
pub fn document_from_json(value: Value) -> StoreResult<Document> {
    match value {
        Value::Object(map) => Ok(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        other => Err(StoreError::InvalidDocument(format!(
            "expected a JSON object, found {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_from_json() {
        let doc = document_from_json(json!({
            "country": "Kenya",
            "country_serial": 23,
            "2015": 12.5,
            "2016": null
        }))
        .unwrap();

        assert_eq!(doc["country"], FieldValue::Text("Kenya".into()));
        assert_eq!(doc["country_serial"], FieldValue::Int(23));
        assert_eq!(doc["2015"], FieldValue::Float(12.5));
        assert!(doc["2016"].is_null());
    }

    #[test]
    fn test_non_object_rejected() {
        let result = document_from_json(json!([1, 2, 3]));
        assert!(matches!(result, Err(StoreError::InvalidDocument(_))));
    }

    #[test]
    fn test_sort_order_across_types() {
        let mut values = vec![
            FieldValue::Text("b".into()),
            FieldValue::Bool(false),
            FieldValue::Float(2.5),
            FieldValue::Null,
            FieldValue::Int(1),
            FieldValue::Text("a".into()),
        ];
        values.sort_by(|a, b| a.sort_cmp(b));

        assert_eq!(
            values,
            vec![
                FieldValue::Null,
                FieldValue::Int(1),
                FieldValue::Float(2.5),
                FieldValue::Text("a".into()),
                FieldValue::Text("b".into()),
                FieldValue::Bool(false),
            ]
        );
    }

    #[test]
    fn test_nan_sorts_below_numbers() {
        let nan = FieldValue::Float(f64::NAN);
        assert_eq!(nan.sort_cmp(&FieldValue::Int(-100)), Ordering::Less);
        assert_eq!(FieldValue::Int(0).sort_cmp(&nan), Ordering::Greater);
    }
}
