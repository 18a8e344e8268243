use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SiftError>;

/// Error type covering the different failure cases that can occur while the
/// pipeline reads configuration, filters tables, or emits workbooks.
#[derive(Debug, Error)]
pub enum SiftError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the delimited-text reader.
    #[error("delimited text error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when JSON serialization of a run report fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a `contain` criterion carries an invalid pattern.
    #[error("invalid criterion pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Raised when a workbook does not contain the requested sheet.
    #[error("missing sheet '{sheet}' in {path}")]
    MissingSheet { path: PathBuf, sheet: String },

    /// Raised when a descriptor declares a file type no reader handles.
    #[error("unsupported input file type: {0}")]
    UnsupportedInputType(String),

    /// Raised when a criterion carries an operator no rule handles.
    #[error("unsupported criterion operator: {0}")]
    UnsupportedOperator(String),

    /// Raised when a numeric operator receives a non-numeric criterion value.
    #[error("criterion value '{0}' is not numeric")]
    InvalidNumericValue(String),

    /// Raised when a numeric comparison hits a non-numeric cell.
    #[error("non-numeric cell '{value}' in column '{column}'")]
    NonNumericCell { column: String, value: String },

    /// Raised when the configuration workbook yields no usable tables.
    #[error("configuration produced no tables: {0}")]
    EmptyConfiguration(PathBuf),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),
}
