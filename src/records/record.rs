//! # Stat Record
//!
//! One statistic for one country, with its per-year values gathered into
//! `data`. Keys made only of ASCII digits are years; all other keys are base
//! fields. Unknown base fields are dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{Document, FieldValue};

pub type RecordResult<T> = Result<T, RecordError>;

/// Document could not be reshaped into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Record is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Record field '{field}' has the wrong type: expected {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    pub country: String,
    pub country_serial: Option<i64>,
    pub metric: String,
    pub unit: Option<String>,
    pub sector: Option<String>,
    pub sub_sector: Option<String>,
    pub sub_sub_sector: Option<String>,
    pub source_link: Option<String>,
    pub source: Option<String>,
    pub data: BTreeMap<String, Option<f64>>,
}

/// True for keys naming a year column
pub fn is_year_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

impl StatRecord {
    pub fn from_document(doc: Document) -> RecordResult<Self> {
        let mut data = BTreeMap::new();
        let mut base = Document::new();

        for (key, value) in doc {
            if is_year_key(&key) {
                let value = year_value(&key, &value)?;
                data.insert(key, value);
            } else {
                base.insert(key, value);
            }
        }

        Ok(Self {
            country: required_text(&mut base, "country")?,
            country_serial: optional_int(&mut base, "country_serial")?,
            metric: required_text(&mut base, "metric")?,
            unit: optional_text(&mut base, "unit")?,
            sector: optional_text(&mut base, "sector")?,
            sub_sector: optional_text(&mut base, "sub_sector")?,
            sub_sub_sector: optional_text(&mut base, "sub_sub_sector")?,
            source_link: optional_text(&mut base, "source_link")?,
            source: optional_text(&mut base, "source")?,
            data,
        })
    }
}

fn wrong_type(field: &str, expected: &'static str) -> RecordError {
    RecordError::WrongType {
        field: field.to_string(),
        expected,
    }
}

fn year_value(key: &str, value: &FieldValue) -> RecordResult<Option<f64>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Int(i) => Ok(Some(*i as f64)),
        FieldValue::Float(f) if f.is_finite() => Ok(Some(*f)),
        FieldValue::Float(_) => Ok(None),
        FieldValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Some)
            .ok_or_else(|| wrong_type(key, "number")),
        _ => Err(wrong_type(key, "number")),
    }
}

fn optional_text(base: &mut Document, field: &'static str) -> RecordResult<Option<String>> {
    match base.remove(field) {
        None | Some(FieldValue::Null) => Ok(None),
        Some(FieldValue::Text(s)) => Ok(Some(s)),
        Some(_) => Err(wrong_type(field, "string")),
    }
}

fn required_text(base: &mut Document, field: &'static str) -> RecordResult<String> {
    optional_text(base, field)?.ok_or(RecordError::MissingField(field))
}

fn optional_int(base: &mut Document, field: &'static str) -> RecordResult<Option<i64>> {
    match base.remove(field) {
        None | Some(FieldValue::Null) => Ok(None),
        Some(FieldValue::Int(i)) => Ok(Some(i)),
        Some(FieldValue::Float(f)) if f.fract() == 0.0 && f.is_finite() => Ok(Some(f as i64)),
        Some(FieldValue::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| wrong_type(field, "integer")),
        Some(_) => Err(wrong_type(field, "integer")),
    }
}
