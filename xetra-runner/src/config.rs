//! Serializable run configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use xetra_core::select::parse_date;
use xetra_core::{LocalStore, SourceColumns};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Parameters of one daily report run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// First date kept in the report, in `source_date_format`.
    pub target_date: String,

    /// chrono format of the date prefix of source keys.
    #[serde(default = "default_source_date_format")]
    pub source_date_format: String,

    /// Field delimiter of the source CSV files.
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: char,

    pub source: StoreConfig,
    pub target: StoreConfig,

    #[serde(default)]
    pub columns: SourceColumns,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Where a store lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    pub root: PathBuf,
}

impl StoreConfig {
    pub fn open(&self) -> LocalStore {
        LocalStore::new(&self.root)
    }
}

/// Naming of the output object: `<key_prefix><YYYYMMDD_HHMMSS>.<extension>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub key_prefix: String,
    pub extension: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            key_prefix: "xetra_daily_report_".into(),
            extension: "parquet".into(),
        }
    }
}

fn default_source_date_format() -> String {
    "%Y-%m-%d".into()
}

fn default_csv_delimiter() -> char {
    ','
}

impl RunConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_target_date()?;
        self.delimiter_byte()?;
        if self.report.key_prefix.is_empty() {
            return Err(ConfigError::Invalid("report.key_prefix is empty".into()));
        }
        let ext = self.report.extension.trim_start_matches('.');
        if ext.is_empty() {
            return Err(ConfigError::Invalid("report.extension is empty".into()));
        }
        if self.columns.required().iter().any(|c| c.is_empty()) {
            return Err(ConfigError::Invalid("column names must not be empty".into()));
        }
        Ok(())
    }

    /// Target date parsed with the source date format.
    pub fn parsed_target_date(&self) -> Result<NaiveDate, ConfigError> {
        parse_date(&self.target_date, &self.source_date_format)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// The CSV delimiter as the single byte the reader expects.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        u8::try_from(self.csv_delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "csv_delimiter {:?} is not a single ASCII character",
                    self.csv_delimiter
                ))
            })
    }

    /// Same config with a different target date, re-validated.
    pub fn with_target_date(&self, target_date: &str) -> Result<Self, ConfigError> {
        let config = Self {
            target_date: target_date.to_string(),
            ..self.clone()
        };
        config.validate()?;
        Ok(config)
    }
}
