use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Pipeline stage a fatal condition originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Load,
    Join,
    Clean,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Load => "load",
            PipelineStage::Join => "join",
            PipelineStage::Clean => "clean",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Input not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Column '{column}' not found in {table} table")]
    Configuration { table: String, column: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{stage} stage produced no usable rows: {message}")]
    EmptyResult {
        stage: PipelineStage,
        message: String,
    },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    pub fn missing_column(table: &str, column: &str) -> Self {
        ProcessingError::Configuration {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    pub fn empty_result(stage: PipelineStage, message: impl Into<String>) -> Self {
        ProcessingError::EmptyResult {
            stage,
            message: message.into(),
        }
    }

    /// Stage the error is attributed to, when it carries one.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            ProcessingError::EmptyResult { stage, .. } => Some(*stage),
            ProcessingError::InputNotFound { .. } => Some(PipelineStage::Load),
            _ => None,
        }
    }
}
