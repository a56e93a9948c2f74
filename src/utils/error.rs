//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while reading a trace
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed on line {line}: {source}")]
    JsonError {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read trace: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),
}

/// Errors that can occur while building or parsing histograms
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HistogramError {
    #[error("Cannot build a histogram from an empty duration set")]
    EmptyInput,

    #[error("Histogram must have at least one bucket")]
    ZeroBuckets,

    #[error("Invalid histogram record: {0}")]
    InvalidRecord(String),
}

/// Errors that can occur while turning aggregated snapshots into histograms
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No label defined for subject {0}")]
    LabelNotFound(u32),

    #[error(transparent)]
    Histogram(#[from] HistogramError),
}

/// Errors that can occur while finalizing paging statistics
#[derive(Error, Debug)]
pub enum PagingError {
    #[error("Paging run is missing the {0} event")]
    MissingField(&'static str),

    #[error(transparent)]
    Histogram(#[from] HistogramError),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Malformed histogram file: {0}")]
    Malformed(#[from] HistogramError),
}

/// Errors that can occur while loading pipeline configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
