// errors.rs
use std::path::PathBuf;

use crate::scraper::ScraperError;

/// Errors raised by the file-based stages (preprocess, clean, report, ...).
/// Per-row problems never surface here; they become sentinels or dropped rows.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("input file '{}' not found", .0.display())]
    MissingInput(PathBuf),

    #[error("could not decode JSON from '{}': {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("table error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("column '{column}' not found (available: {available})")]
    MissingColumn { column: String, available: String },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Scraper(#[from] ScraperError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            PipelineError::MissingInput(path)
        } else {
            PipelineError::Io { path, source }
        }
    }

    /// Input problems that are reported to the user and end the run with a
    /// zero exit status.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingInput(_)
                | PipelineError::InvalidJson { .. }
                | PipelineError::MissingColumn { .. }
        )
    }
}
