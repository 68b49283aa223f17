//! Configuration schema (tablesweep.toml)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which checks to run; independently selectable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checks {
    /// Run the unused-tables check
    #[serde(default = "default_true")]
    pub tables: bool,

    /// Run the unused-columns check
    #[serde(default = "default_true")]
    pub columns: bool,
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            tables: true,
            columns: true,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Project that owns the destination dataset
    #[serde(default)]
    pub project_id: String,

    /// Path to a service account key file; Application Default Credentials
    /// are used when absent
    #[serde(default)]
    pub credentials: Option<PathBuf>,

    /// Checks to run
    #[serde(default)]
    pub checks: Checks,

    /// Fraction in [0, 1) subtracted from the storage rate.
    ///
    /// Out-of-range values are not rejected; the cost formula simply runs
    /// with them.
    #[serde(default)]
    pub discount: f64,

    /// Dataset the result tables are written into
    #[serde(default = "default_destination_dataset")]
    pub destination_dataset: String,

    /// Region qualifier for the job-history views
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            credentials: None,
            checks: Checks::default(),
            discount: 0.0,
            destination_dataset: default_destination_dataset(),
            region: default_region(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

fn default_true() -> bool {
    true
}

fn default_destination_dataset() -> String {
    "data_defender".to_string()
}

fn default_region() -> String {
    "region-us".to_string()
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
