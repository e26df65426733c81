use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while turning a data source into a
/// [`SalesTable`](super::model::SalesTable). All variants are fatal for the
/// session: the dashboard shows the message instead of partial results.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Data source not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// `row` is 1-based and counts data rows only (the header is not a row).
    #[error("Row {row}, column '{column}': {reason}")]
    InvalidCell {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}
