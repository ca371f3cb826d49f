use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::CategoricalField;

/// Failure to produce a [`Dataset`](crate::data::model::Dataset). Fatal at
/// startup; no partial dataset is ever returned.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// A filter specification that cannot be evaluated. Reported before any
/// computation starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSpecError {
    #[error("no allowed-set given for '{0}'")]
    MissingField(CategoricalField),

    #[error("age range is inverted: min {min} > max {max}")]
    InvertedAgeRange { min: i64, max: i64 },

    #[error("malformed filter spec: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}
