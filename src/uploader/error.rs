// ==========================================
// Asset Ledger - upload pipeline error types
// ==========================================
// thiserror derive. Per-row conditions never surface here: they become
// ValidationErrors in the UploadResult. Everything in this enum fails
// the upload call itself.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Batch-level upload errors.
#[derive(Error, Debug)]
pub enum UploadError {
    // ===== file errors =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (expected .xlsx/.xls/.csv)")]
    UnsupportedFormat(String),

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("Excel parse failed: {0}")]
    ExcelParseError(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    // ===== batch guards =====
    #[error("file has {actual} data rows, above the {limit} row limit")]
    TooManyRows { limit: usize, actual: usize },

    // ===== wiring =====
    #[error("no upload handler registered for record kind '{0}'")]
    UnknownRecordKind(String),

    // ===== report generation =====
    #[error("error report generation failed: {0}")]
    ReportError(String),

    // ===== infrastructure (batch indeterminate) =====
    #[error("repository failure, batch state indeterminate: {0}")]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        UploadError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for UploadError {
    fn from(err: csv::Error) -> Self {
        UploadError::CsvParseError(err.to_string())
    }
}

impl From<calamine::XlsxError> for UploadError {
    fn from(err: calamine::XlsxError) -> Self {
        UploadError::ExcelParseError(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for UploadError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        UploadError::ReportError(err.to_string())
    }
}
