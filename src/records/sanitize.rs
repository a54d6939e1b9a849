//! Non-finite float scrubbing
//!
//! JSON has no NaN or Infinity. Stored documents may hold them, so they are
//! replaced with null before a document is reshaped or serialized.

use crate::store::{Document, FieldValue};

/// Replace every NaN and ±Infinity in `doc` with null, including inside
/// nested maps and lists
pub fn sanitize_floats(doc: &mut Document) {
    for value in doc.values_mut() {
        sanitize_value(value);
    }
}

fn sanitize_value(value: &mut FieldValue) {
    match value {
        FieldValue::Float(f) if !f.is_finite() => *value = FieldValue::Null,
        FieldValue::Map(map) => map.values_mut().for_each(sanitize_value),
        FieldValue::List(items) => items.iter_mut().for_each(sanitize_value),
        _ => {}
    }
}
