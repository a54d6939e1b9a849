//! # Query Compiler
//!
//! Compiles [`FilterCriteria`] into a [`QueryPlan`]: a predicate for the
//! store plus a projection bounded to the selected years.
//!
//! Year precedence is the same on both sides of the plan: an exact year,
//! then a range, then the fallback policy. When a range is used the
//! predicate and the projection are derived from the same resolved range.

use serde_json::{json, Value};

use super::criteria::{year_field, FilterCriteria, YearRange, YearSelection, DEFAULT_WINDOW};
use super::predicate::{Predicate, PredicateBuilder};
use super::projection::Projection;

/// What to project when the criteria carry no year filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionFallback {
    /// Project a fixed window of years
    DefaultWindow(YearRange),
    /// Project metadata fields only
    MetadataOnly,
}

impl ProjectionFallback {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionFallback::DefaultWindow(_) => "default-window",
            ProjectionFallback::MetadataOnly => "metadata-only",
        }
    }
}

/// Per-caller compile policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Bounds substituted for a missing `start_year` / `end_year`
    pub range_defaults: YearRange,
    pub fallback: ProjectionFallback,
}

impl CompileOptions {
    pub fn new(range_defaults: YearRange, fallback: ProjectionFallback) -> Self {
        Self {
            range_defaults,
            fallback,
        }
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            range_defaults: DEFAULT_WINDOW,
            fallback: ProjectionFallback::DefaultWindow(DEFAULT_WINDOW),
        }
    }
}

/// Compiled query: predicate plus projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    predicate: Predicate,
    projection: Projection,
}

impl QueryPlan {
    pub fn new(predicate: Predicate, projection: Projection) -> Self {
        Self {
            predicate,
            projection,
        }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Filter and projection documents for MongoDB-style stores
    pub fn to_documents(&self) -> Value {
        json!({
            "filter": self.predicate.to_filter_document(),
            "projection": self.projection.to_projection_document(),
        })
    }
}

/// Compiles filter criteria under a fixed policy
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryCompiler {
    options: CompileOptions,
}

impl QueryCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn compile(&self, criteria: &FilterCriteria) -> QueryPlan {
        let mut builder = PredicateBuilder::new();

        if let Some(country) = non_empty(&criteria.country) {
            builder = builder.exact("country", country);
        }
        if let Some(metric) = non_empty(&criteria.metric) {
            builder = builder.contains("metric", metric);
        }
        if let Some(sub_sector) = non_empty(&criteria.sub_sector) {
            builder = builder.contains("sub_sector", sub_sector);
        }
        if let Some(sub_sub_sector) = non_empty(&criteria.sub_sub_sector) {
            builder = builder.contains("sub_sub_sector", sub_sub_sector);
        }

        let projection = match criteria.year_selection(self.options.range_defaults) {
            YearSelection::Exact(year) => {
                let field = year_field(year);
                builder = builder.present(field.clone());
                Projection::with_year_fields(vec![field])
            }
            YearSelection::Range(range) => {
                let fields = range.field_names();
                builder = builder.any_present(fields.clone());
                Projection::with_year_fields(fields)
            }
            YearSelection::Unfiltered => match self.options.fallback {
                ProjectionFallback::DefaultWindow(window) => {
                    Projection::with_year_fields(window.field_names())
                }
                ProjectionFallback::MetadataOnly => Projection::metadata_only(),
            },
        };

        QueryPlan::new(builder.build(), projection)
    }
}

/// Compile with explicit range defaults and the default-window fallback
pub fn compile(
    criteria: &FilterCriteria,
    default_range_start: i32,
    default_range_end: i32,
) -> QueryPlan {
    let options = CompileOptions::new(
        YearRange::new(default_range_start, default_range_end),
        ProjectionFallback::DefaultWindow(DEFAULT_WINDOW),
    );
    QueryCompiler::new(options).compile(criteria)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
