use crate::error::{Result, YahrzeitError};
use crate::weeks::DEFAULT_WEEK_START;
use chrono::Weekday;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_CSV_FOLDER: &str = "csv_files";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_MASTER_SHEET_NAME: &str = "Master";
pub const DEFAULT_MIN_SOURCES: usize = 3;
pub const DEFAULT_MAX_SOURCES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessorConfig {
    #[serde(default = "default_csv_folder")]
    #[schemars(description = "Folder scanned for monthly yahrzeit CSV exports")]
    pub csv_folder: PathBuf,

    #[serde(default = "default_min_sources")]
    #[schemars(
        description = "Minimum number of CSV exports required. The middle-month rule assumes three consecutive months."
    )]
    pub min_sources: usize,

    #[serde(default = "default_max_sources")]
    #[schemars(
        description = "When more exports are present, only this many of the most recently modified are used"
    )]
    pub max_sources: usize,

    #[serde(default = "default_week_start")]
    #[schemars(
        with = "String",
        description = "Weekday each week starts on (e.g. 'Sat'). The week ends on the preceding weekday."
    )]
    pub week_start: Weekday,
}

fn default_csv_folder() -> PathBuf {
    PathBuf::from(DEFAULT_CSV_FOLDER)
}

fn default_min_sources() -> usize {
    DEFAULT_MIN_SOURCES
}

fn default_max_sources() -> usize {
    DEFAULT_MAX_SOURCES
}

fn default_week_start() -> Weekday {
    DEFAULT_WEEK_START
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            csv_folder: default_csv_folder(),
            min_sources: DEFAULT_MIN_SOURCES,
            max_sources: DEFAULT_MAX_SOURCES,
            week_start: DEFAULT_WEEK_START,
        }
    }
}

impl ProcessorConfig {
    /// Defaults overridden by `CSV_FOLDER_PATH`, `MIN_CSV_FILES_REQUIRED`,
    /// `MAX_CSV_FILES_TO_PROCESS` and `WEEK_START_DAY`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(folder) = lookup("CSV_FOLDER_PATH") {
            config.csv_folder = PathBuf::from(folder);
        }
        if let Some(value) = lookup("MIN_CSV_FILES_REQUIRED") {
            config.min_sources = parse_setting("MIN_CSV_FILES_REQUIRED", &value)?;
        }
        if let Some(value) = lookup("MAX_CSV_FILES_TO_PROCESS") {
            config.max_sources = parse_setting("MAX_CSV_FILES_TO_PROCESS", &value)?;
        }
        if let Some(value) = lookup("WEEK_START_DAY") {
            config.week_start = parse_setting("WEEK_START_DAY", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_sources == 0 {
            return Err(YahrzeitError::ConfigError(
                "min_sources must be at least 1".to_string(),
            ));
        }
        if self.max_sources < self.min_sources {
            return Err(YahrzeitError::ConfigError(format!(
                "max_sources ({}) must not be below min_sources ({})",
                self.max_sources, self.min_sources
            )));
        }
        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ProcessorConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

/// Settings handed to a [`crate::delivery::Delivery`] implementation. The core
/// never reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeliveryConfig {
    #[serde(default = "default_output_dir")]
    #[schemars(description = "Directory that receives one sub-folder per delivered report")]
    pub output_dir: PathBuf,

    #[serde(default = "default_master_sheet_name")]
    #[schemars(description = "Name of the sheet holding all weeks concatenated")]
    pub master_sheet_name: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_master_sheet_name() -> String {
    DEFAULT_MASTER_SHEET_NAME.to_string()
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            master_sheet_name: default_master_sheet_name(),
        }
    }
}

impl DeliveryConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = lookup("OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup("MASTER_SHEET_NAME") {
            let name = name.trim();
            if name.is_empty() {
                return Err(YahrzeitError::ConfigError(
                    "MASTER_SHEET_NAME must not be empty".to_string(),
                ));
            }
            config.master_sheet_name = name.to_string();
        }
        Ok(config)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DeliveryConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

fn parse_setting<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| YahrzeitError::ConfigError(format!("Invalid value for {}: '{}'", key, value)))
}
