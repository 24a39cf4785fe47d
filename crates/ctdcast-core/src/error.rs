use chrono::NaiveDate;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("malformed series '{series}': {message}")]
    MalformedSeries { series: String, message: String },

    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("cannot derive quantities for {date} profile {index}: missing channel '{channel}'")]
    Derivation {
        date: NaiveDate,
        index: usize,
        channel: String,
    },

    #[error("failed to render diagnostic figure: {0}")]
    Render(String),

    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessingError {
    /// Stable kind label recorded in manifest failure entries.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessingError::MalformedSeries { .. } => "MalformedSeriesError",
            ProcessingError::InvalidParameter { .. } => "InvalidParameterError",
            ProcessingError::Derivation { .. } => "DerivationError",
            ProcessingError::Render(_) => "RenderError",
            ProcessingError::Polars(_) => "PolarsError",
            ProcessingError::Io(_) => "IoError",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProcessingError>;
