//! # Records
//!
//! Reshaping of stored documents into API records: non-finite floats are
//! scrubbed, then base fields are split from the per-year `data` map.

mod record;
mod sanitize;

pub use record::{is_year_key, RecordError, RecordResult, StatRecord};
pub use sanitize::sanitize_floats;
