//! # Query Parameter Parser
//!
//! Parses data-route query parameters into filter criteria and find options.

use std::collections::HashMap;

use crate::query::{FilterCriteria, YEAR_MAX, YEAR_MIN};
use crate::store::{FindOptions, SortDirection, SortSpec};

use super::errors::{ApiError, ApiResult};

/// Maximum number of records that can be returned
pub const MAX_LIMIT: usize = 1000;

/// Default limit if not specified
pub const DEFAULT_LIMIT: usize = 50;

/// Parsed data-route parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DataQuery {
    pub criteria: FilterCriteria,
    pub options: FindOptions,
}

impl Default for DataQuery {
    fn default() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            options: FindOptions {
                skip: 0,
                limit: DEFAULT_LIMIT,
                sort: None,
            },
        }
    }
}

impl DataQuery {
    /// Parse query parameters from a HashMap. Unknown keys are ignored.
    pub fn parse(params: &HashMap<String, String>) -> ApiResult<Self> {
        let mut result = DataQuery::default();
        let mut sort_by = None;
        let mut direction = SortDirection::Ascending;

        for (key, value) in params {
            match key.as_str() {
                "country" => result.criteria.country = text(value),
                "metric" => result.criteria.metric = text(value),
                "sub_sector" => result.criteria.sub_sector = text(value),
                "sub_sub_sector" => result.criteria.sub_sub_sector = text(value),
                "year" => result.criteria.year = parse_year(key, value)?,
                "start_year" => result.criteria.start_year = parse_year(key, value)?,
                "end_year" => result.criteria.end_year = parse_year(key, value)?,
                "limit" => result.options.limit = parse_limit(value)?,
                "skip" => result.options.skip = parse_skip(value)?,
                "sort_by" => sort_by = text(value),
                "sort_order" => direction = parse_sort_order(value)?,
                _ => {}
            }
        }

        result.options.sort = sort_by.map(|field| SortSpec { field, direction });
        Ok(result)
    }
}

/// Empty strings count as absent
fn text(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_year(name: &str, value: &str) -> ApiResult<Option<i32>> {
    if value.trim().is_empty() {
        return Ok(None);
    }

    let year: i32 = value
        .trim()
        .parse()
        .map_err(|_| ApiError::invalid_param(name, format!("'{}' is not an integer", value)))?;

    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        return Err(ApiError::invalid_param(
            name,
            format!("must be between {} and {}", YEAR_MIN, YEAR_MAX),
        ));
    }

    Ok(Some(year))
}

fn parse_limit(value: &str) -> ApiResult<usize> {
    let limit: usize = value
        .trim()
        .parse()
        .map_err(|_| ApiError::invalid_param("limit", format!("'{}' is not a count", value)))?;

    if limit == 0 || limit > MAX_LIMIT {
        return Err(ApiError::invalid_param(
            "limit",
            format!("must be between 1 and {}", MAX_LIMIT),
        ));
    }

    Ok(limit)
}

fn parse_skip(value: &str) -> ApiResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::invalid_param("skip", "must be a non-negative integer"))
}

fn parse_sort_order(value: &str) -> ApiResult<SortDirection> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(SortDirection::from_order)
        .ok_or_else(|| ApiError::invalid_param("sort_order", "must be 1 or -1"))
}
