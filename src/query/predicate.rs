//! # Predicate
//!
//! Immutable filter predicate produced by [`PredicateBuilder`].
//!
//! A predicate is a conjunction of clauses. Text clauses compare a field
//! case-insensitively; presence clauses require a field to exist and be
//! non-null; an any-present clause is a disjunction of presence checks.

use serde_json::{json, Map, Value};

use crate::store::{Document, FieldValue};

/// Case-insensitive text comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    /// Whole-value match
    Exact(String),
    /// Substring match anywhere in the value
    Contains(String),
}

impl TextMatch {
    /// The needle as given by the caller
    pub fn needle(&self) -> &str {
        match self {
            TextMatch::Exact(s) | TextMatch::Contains(s) => s,
        }
    }

    /// Check a field value against this matcher
    pub fn matches(&self, value: &str) -> bool {
        let value = value.to_lowercase();
        let needle = self.needle().to_lowercase();
        match self {
            TextMatch::Exact(_) => value == needle,
            TextMatch::Contains(_) => value.contains(&needle),
        }
    }

    /// Regex source for document stores that match with regular expressions.
    /// The needle is escaped, so it always matches literally.
    pub fn regex_source(&self) -> String {
        let escaped = regex::escape(self.needle());
        match self {
            TextMatch::Exact(_) => format!("^{}$", escaped),
            TextMatch::Contains(_) => escaped,
        }
    }
}

/// A single predicate clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Text field comparison
    Text { field: String, matcher: TextMatch },
    /// Field exists and is not null
    Present(String),
    /// At least one of the fields exists and is not null
    AnyPresent(Vec<String>),
}

impl Clause {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Clause::Text { field, matcher } => match doc.get(field) {
                Some(FieldValue::Text(value)) => matcher.matches(value),
                _ => false,
            },
            Clause::Present(field) => is_present(doc, field),
            Clause::AnyPresent(fields) => fields.iter().any(|f| is_present(doc, f)),
        }
    }
}

fn is_present(doc: &Document, field: &str) -> bool {
    doc.get(field).is_some_and(|v| !v.is_null())
}

fn present_condition() -> Value {
    json!({"$exists": true, "$ne": null})
}

/// Conjunction of clauses. An empty predicate matches every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Check whether a document satisfies every clause
    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses.iter().all(|c| c.matches(doc))
    }

    /// Fields named by presence clauses (single and disjunctive)
    pub fn year_fields(&self) -> Vec<&str> {
        self.clauses
            .iter()
            .flat_map(|c| match c {
                Clause::Present(field) => vec![field.as_str()],
                Clause::AnyPresent(fields) => fields.iter().map(String::as_str).collect(),
                Clause::Text { .. } => Vec::new(),
            })
            .collect()
    }

    /// Render as a MongoDB-style filter document.
    pub fn to_filter_document(&self) -> Value {
        let mut filter = Map::new();

        for clause in &self.clauses {
            match clause {
                Clause::Text { field, matcher } => {
                    filter.insert(
                        field.clone(),
                        json!({"$regex": matcher.regex_source(), "$options": "i"}),
                    );
                }
                Clause::Present(field) => {
                    filter.insert(field.clone(), present_condition());
                }
                Clause::AnyPresent(fields) => {
                    let alternatives = fields
                        .iter()
                        .map(|f| {
                            let mut alt = Map::new();
                            alt.insert(f.clone(), present_condition());
                            Value::Object(alt)
                        })
                        .collect();
                    filter.insert("$or".to_string(), Value::Array(alternatives));
                }
            }
        }

        Value::Object(filter)
    }
}

/// Builds a [`Predicate`] clause by clause
#[derive(Debug, Default)]
pub struct PredicateBuilder {
    clauses: Vec<Clause>,
}

impl PredicateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a whole-value, case-insensitive match
    pub fn exact(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::Text {
            field: field.into(),
            matcher: TextMatch::Exact(value.into()),
        });
        self
    }

    /// Add a case-insensitive substring match
    pub fn contains(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::Text {
            field: field.into(),
            matcher: TextMatch::Contains(value.into()),
        });
        self
    }

    /// Require a field to be present and non-null
    pub fn present(mut self, field: impl Into<String>) -> Self {
        self.clauses.push(Clause::Present(field.into()));
        self
    }

    /// Require any of the fields to be present. No clause is added for an
    /// empty field list.
    pub fn any_present(mut self, fields: Vec<String>) -> Self {
        if !fields.is_empty() {
            self.clauses.push(Clause::AnyPresent(fields));
        }
        self
    }

    pub fn build(self) -> Predicate {
        Predicate {
            clauses: self.clauses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::document_from_json;

    #[test]
    fn test_exact_match_is_anchored_and_case_insensitive() {
        let m = TextMatch::Exact("Kenya".to_string());
        assert!(m.matches("Kenya"));
        assert!(m.matches("KENYA"));
        assert!(!m.matches("Kenyan"));
        assert!(!m.matches("kenya2"));
    }

    #[test]
    fn test_contains_match() {
        let m = TextMatch::Contains("access".to_string());
        assert!(m.matches("Electricity Access (%)"));
        assert!(!m.matches("Generation"));
    }

    #[test]
    fn test_regex_source_escapes_input() {
        assert_eq!(TextMatch::Exact("Kenya".into()).regex_source(), "^Kenya$");
        assert_eq!(
            TextMatch::Contains("GDP (US$)".into()).regex_source(),
            r"GDP \(US\$\)"
        );
    }

    #[test]
    fn test_presence_rejects_null() {
        let predicate = PredicateBuilder::new().present("2015").build();

        let with_value = document_from_json(json!({"2015": 1.5})).unwrap();
        let with_null = document_from_json(json!({"2015": null})).unwrap();
        let missing = document_from_json(json!({"2014": 3})).unwrap();

        assert!(predicate.matches(&with_value));
        assert!(!predicate.matches(&with_null));
        assert!(!predicate.matches(&missing));
    }

    #[test]
    fn test_any_present() {
        let predicate = PredicateBuilder::new()
            .any_present(vec!["2010".into(), "2011".into()])
            .build();

        let doc = document_from_json(json!({"2010": null, "2011": 7})).unwrap();
        assert!(predicate.matches(&doc));

        let doc = document_from_json(json!({"2010": null, "2012": 7})).unwrap();
        assert!(!predicate.matches(&doc));
    }

    #[test]
    fn test_empty_any_present_adds_nothing() {
        let predicate = PredicateBuilder::new().any_present(Vec::new()).build();
        assert!(predicate.is_empty());
        assert_eq!(predicate.to_filter_document(), json!({}));
    }

    #[test]
    fn test_text_clause_ignores_non_text_values() {
        let predicate = PredicateBuilder::new().exact("country", "1").build();
        let doc = document_from_json(json!({"country": 1})).unwrap();
        assert!(!predicate.matches(&doc));
    }

    #[test]
    fn test_filter_document_rendering() {
        let predicate = PredicateBuilder::new()
            .exact("country", "Kenya")
            .contains("metric", "gdp")
            .any_present(vec!["2010".into(), "2011".into()])
            .build();

        assert_eq!(
            predicate.to_filter_document(),
            json!({
                "country": {"$regex": "^Kenya$", "$options": "i"},
                "metric": {"$regex": "gdp", "$options": "i"},
                "$or": [
                    {"2010": {"$exists": true, "$ne": null}},
                    {"2011": {"$exists": true, "$ne": null}}
                ]
            })
        );
    }
}
