//! # Filter Criteria
//!
//! Optional filter fields accepted by the data endpoints, and the year
//! selection they resolve to.

use serde::{Deserialize, Serialize};

/// Lowest year accepted by the request layer
pub const YEAR_MIN: i32 = 1900;

/// Highest year accepted by the request layer
pub const YEAR_MAX: i32 = 2100;

/// Start bound used when only `end_year` is given
pub const DEFAULT_RANGE_START: i32 = 2000;

/// Window projected when no year filter is given (default-window policy)
pub const DEFAULT_WINDOW: YearRange = YearRange::new(2000, 2022);

/// Filter fields for a statistics query. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive exact country name
    pub country: Option<String>,
    /// Case-insensitive metric substring
    pub metric: Option<String>,
    /// Case-insensitive sub-sector substring
    pub sub_sector: Option<String>,
    /// Case-insensitive sub-sub-sector substring
    pub sub_sub_sector: Option<String>,
    /// Single year; takes precedence over the range fields
    pub year: Option<i32>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = Some(metric.into());
        self
    }

    pub fn sub_sector(mut self, sub_sector: impl Into<String>) -> Self {
        self.sub_sector = Some(sub_sector.into());
        self
    }

    pub fn sub_sub_sector(mut self, sub_sub_sector: impl Into<String>) -> Self {
        self.sub_sub_sector = Some(sub_sub_sector.into());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn start_year(mut self, start_year: i32) -> Self {
        self.start_year = Some(start_year);
        self
    }

    pub fn end_year(mut self, end_year: i32) -> Self {
        self.end_year = Some(end_year);
        self
    }

    /// Resolve the year filter. An exact year wins over any range bounds;
    /// a half-open range borrows its missing bound from `defaults`.
    pub fn year_selection(&self, defaults: YearRange) -> YearSelection {
        if let Some(year) = self.year {
            return YearSelection::Exact(year);
        }

        match (self.start_year, self.end_year) {
            (None, None) => YearSelection::Unfiltered,
            (start, end) => YearSelection::Range(YearRange::new(
                start.unwrap_or(defaults.start),
                end.unwrap_or(defaults.end),
            )),
        }
    }
}

/// Inclusive range of years. `start > end` is a valid, empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Number of years covered
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    /// Field names for every year in the range
    pub fn field_names(&self) -> Vec<String> {
        self.years().map(year_field).collect()
    }
}

/// Resolved year filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSelection {
    Exact(i32),
    Range(YearRange),
    Unfiltered,
}

/// Year-keyed documents store each year under its decimal numeral.
pub fn year_field(year: i32) -> String {
    year.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: YearRange = YearRange::new(2000, 2024);

    #[test]
    fn test_exact_year_wins_over_range() {
        let criteria = FilterCriteria::new().year(2015).start_year(2010).end_year(2012);
        assert_eq!(criteria.year_selection(DEFAULTS), YearSelection::Exact(2015));
    }

    #[test]
    fn test_half_open_ranges_take_defaults() {
        let start_only = FilterCriteria::new().start_year(2020);
        assert_eq!(
            start_only.year_selection(DEFAULTS),
            YearSelection::Range(YearRange::new(2020, 2024))
        );

        let end_only = FilterCriteria::new().end_year(2003);
        assert_eq!(
            end_only.year_selection(DEFAULTS),
            YearSelection::Range(YearRange::new(2000, 2003))
        );
    }

    #[test]
    fn test_no_year_fields_is_unfiltered() {
        let criteria = FilterCriteria::new().country("Kenya");
        assert_eq!(criteria.year_selection(DEFAULTS), YearSelection::Unfiltered);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = YearRange::new(2012, 2010);
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert!(range.field_names().is_empty());
    }

    #[test]
    fn test_range_field_names() {
        let range = YearRange::new(2010, 2012);
        assert_eq!(range.len(), 3);
        assert_eq!(range.field_names(), vec!["2010", "2011", "2012"]);
    }
}
