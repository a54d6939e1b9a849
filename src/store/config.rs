//! Database Configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Document store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database name reported in logs (default: "africaenergyapi")
    #[serde(default = "default_name")]
    pub name: String,

    /// Directory holding `<collection>.json` seed files (default: "./data")
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_name() -> String {
    "africaenergyapi".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
        }
    }
}

impl DatabaseConfig {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }
}
