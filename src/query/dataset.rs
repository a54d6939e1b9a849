//! # Datasets
//!
//! Each dataset names its collection and the compile policy its endpoint
//! uses.

use std::fmt;
use std::str::FromStr;

use super::compiler::{CompileOptions, ProjectionFallback, QueryCompiler};
use super::criteria::{YearRange, DEFAULT_RANGE_START, DEFAULT_WINDOW};

/// End bound substituted for a missing `end_year`
pub const DEFAULT_RANGE_END: i32 = 2024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// Socio-economic indicators
    Economic,
    /// Electricity sector statistics
    Electricity,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::Economic, Dataset::Electricity];

    /// URL path segment and CLI name
    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Economic => "economic",
            Dataset::Electricity => "electricity",
        }
    }

    /// Backing document collection
    pub fn collection(&self) -> &'static str {
        match self {
            Dataset::Economic => "social_collection",
            Dataset::Electricity => "electrical_collection",
        }
    }

    pub fn compile_options(&self) -> CompileOptions {
        let range_defaults = YearRange::new(DEFAULT_RANGE_START, DEFAULT_RANGE_END);
        match self {
            Dataset::Economic => CompileOptions::new(
                range_defaults,
                ProjectionFallback::DefaultWindow(DEFAULT_WINDOW),
            ),
            Dataset::Electricity => {
                CompileOptions::new(range_defaults, ProjectionFallback::MetadataOnly)
            }
        }
    }

    pub fn compiler(&self) -> QueryCompiler {
        QueryCompiler::new(self.compile_options())
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dataset::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown dataset: '{}'", s))
    }
}
