use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Input dataset not found: {table} ({path})")]
    MissingInput { table: &'static str, path: PathBuf },

    #[error("Required column '{column}' missing from {table}")]
    MissingColumn { table: &'static str, column: &'static str },

    #[error("Blank '{column}' in {table} at line {line}")]
    MissingValue {
        table: &'static str,
        column: &'static str,
        line: u64,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Metrics error: {0}")]
    Metrics(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
