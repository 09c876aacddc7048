//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ingest::{default_date_formats, IngestOptions};
use crate::report::Section;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Ingest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Date formats tried in order for the `Date` column
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            date_formats: default_date_formats(),
        }
    }
}

impl IngestConfig {
    pub fn options(&self) -> IngestOptions {
        IngestOptions {
            date_formats: self.date_formats.clone(),
        }
    }
}

/// Report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rows shown in the home/away leader tables
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Width in characters of the longest chart bar
    #[serde(default = "default_chart_width")]
    pub chart_width: usize,

    /// Sections rendered by `report` when none are given on the command line
    #[serde(default = "default_sections")]
    pub sections: Vec<Section>,
}

fn default_top_n() -> usize {
    10
}

fn default_chart_width() -> usize {
    50
}

fn default_sections() -> Vec<Section> {
    Section::all().to_vec()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            chart_width: default_chart_width(),
            sections: default_sections(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Results file to analyse
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Where `export` writes derived tables
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("./EPL_Set.csv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            output_dir: default_output_dir(),
            log_level: default_log_level(),
            ingest: IngestConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report.top_n == 0 {
            return Err(ConfigError::ValidationError(
                "report.top_n must be greater than 0".to_string(),
            ));
        }

        if self.report.chart_width < 10 {
            return Err(ConfigError::ValidationError(
                "report.chart_width must be at least 10".to_string(),
            ));
        }

        if self.ingest.date_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "ingest.date_formats must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
