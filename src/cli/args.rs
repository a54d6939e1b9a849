//! CLI argument definitions using clap
//!
//! Commands:
//! - africa-energy-api serve [--config <path>]
//! - africa-energy-api check-config [--config <path>]
//! - africa-energy-api explain --dataset <name> [filters]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::query::{Dataset, FilterCriteria};

/// Africa Energy API - electricity and socio-economic indicators for African countries
#[derive(Parser, Debug)]
#[command(name = "africa-energy-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to an optional JSON settings file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the effective settings with secrets redacted
    CheckConfig {
        /// Path to an optional JSON settings file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the compiled filter and projection for a query
    Explain {
        /// Dataset to query: economic or electricity
        #[arg(long)]
        dataset: Dataset,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Query filters accepted by `explain`
#[derive(clap::Args, Debug, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub country: Option<String>,

    #[arg(long)]
    pub metric: Option<String>,

    #[arg(long)]
    pub sub_sector: Option<String>,

    #[arg(long)]
    pub sub_sub_sector: Option<String>,

    #[arg(long, value_parser = clap::value_parser!(i32).range(1900..=2100))]
    pub year: Option<i32>,

    #[arg(long, value_parser = clap::value_parser!(i32).range(1900..=2100))]
    pub start_year: Option<i32>,

    #[arg(long, value_parser = clap::value_parser!(i32).range(1900..=2100))]
    pub end_year: Option<i32>,
}

impl FilterArgs {
    pub fn to_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            country: self.country.clone(),
            metric: self.metric.clone(),
            sub_sector: self.sub_sector.clone(),
            sub_sub_sector: self.sub_sub_sector.clone(),
            year: self.year,
            start_year: self.start_year,
            end_year: self.end_year,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_explain() {
        let cli = Cli::try_parse_from([
            "africa-energy-api",
            "explain",
            "--dataset",
            "Electricity",
            "--country",
            "Kenya",
            "--start-year",
            "2010",
        ])
        .unwrap();

        let Command::Explain { dataset, filters } = cli.command else {
            panic!("expected explain");
        };
        assert_eq!(dataset, Dataset::Electricity);
        let criteria = filters.to_criteria();
        assert_eq!(criteria.country.as_deref(), Some("Kenya"));
        assert_eq!(criteria.start_year, Some(2010));
        assert_eq!(criteria.end_year, None);
    }

    #[test]
    fn test_year_out_of_range_rejected() {
        let result = Cli::try_parse_from([
            "africa-energy-api",
            "explain",
            "--dataset",
            "economic",
            "--year",
            "1850",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_dataset_rejected() {
        let result = Cli::try_parse_from(["africa-energy-api", "explain", "--dataset", "energy"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_serve_config_optional() {
        let cli = Cli::try_parse_from(["africa-energy-api", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { config: None }));
    }
}
