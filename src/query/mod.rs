//! # Query Module
//!
//! Compiles optional filter fields into a store predicate and a year-bounded
//! projection.

pub mod compiler;
pub mod criteria;
pub mod dataset;
pub mod predicate;
pub mod projection;

pub use compiler::{compile, CompileOptions, ProjectionFallback, QueryCompiler, QueryPlan};
pub use criteria::{FilterCriteria, YearRange, YearSelection, YEAR_MAX, YEAR_MIN};
pub use dataset::Dataset;
pub use predicate::{Clause, Predicate, PredicateBuilder, TextMatch};
pub use projection::{Projection, METADATA_FIELDS, RECORD_ID_FIELD};
