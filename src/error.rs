//! Error types for price and event loading.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("{} is missing required column(s): {}", path.display(), columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("Date parsing error at row {row}: '{value}' does not match {expected}")]
    DateParse {
        row: usize,
        value: String,
        expected: String,
    },

    #[error("Invalid value at row {row}, column '{column}': '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Coarse classification of a [`DataError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested path does not exist.
    FileNotFound,
    /// A required column is absent from a well-formed file.
    Schema,
    /// A field failed to parse under its declared format.
    Parse,
    /// Any other I/O or malformed delimited text.
    Io,
    /// Configuration or serialization problems.
    Config,
}

impl DataError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataError::FileNotFound { .. } => ErrorKind::FileNotFound,
            DataError::MissingColumns { .. } => ErrorKind::Schema,
            DataError::DateParse { .. } | DataError::InvalidValue { .. } => ErrorKind::Parse,
            DataError::CsvError(_) | DataError::IoError(_) => ErrorKind::Io,
            DataError::ConfigError(_) | DataError::TomlError(_) | DataError::JsonError(_) => {
                ErrorKind::Config
            }
        }
    }
}

/// Result type alias for data preparation operations.
pub type Result<T> = std::result::Result<T, DataError>;
