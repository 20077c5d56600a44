use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum YahrzeitError {
    #[error("Invalid target month {month}/{year}: not a valid calendar month")]
    InvalidTargetMonth { month: u32, year: i32 },

    #[error("No input sources supplied")]
    NoSources,

    #[error("Found only {found} CSV files in '{folder}'. At least {required} are required")]
    NotEnoughSources {
        found: usize,
        required: usize,
        folder: PathBuf,
    },

    #[error("Source folder '{0}' not found or is not a directory")]
    SourceFolderMissing(PathBuf),

    #[error("Failed to read source '{label}': {details}")]
    SourceRead { label: String, details: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Delivery error: {0}")]
    DeliveryError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, YahrzeitError>;
