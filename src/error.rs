//! Error types for loading and filtering time series.
//!
//! - [`DataLoadError`] - the file, sheet or columns are unusable
//! - [`ParseError`] - a period label is not a date
//! - [`ValidationError`] - a filter or forecast request is malformed
//!
//! [`LoadError`] unifies the two loader failures so `?` works across them.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Loader Errors
// =============================================================================

/// The spreadsheet could not be turned into a table.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {message}", path.display())]
    Unreadable { path: PathBuf, message: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("workbook contains no worksheet")]
    NoSheet,

    #[error("index column '{0}' not found")]
    MissingIndexColumn(String),

    #[error("no data columns besides the index column")]
    NoDataColumns,

    /// A data cell holds something other than a number or a blank.
    #[error("row {row}, column '{column}': '{value}' is not a number")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("period {0} appears more than once")]
    DuplicatePeriod(NaiveDate),

    #[error("column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("column '{column}' has {found} values for {expected} periods")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// A period label that cannot be read as a date.
#[derive(Debug, Error)]
#[error("row {row}: cannot parse period label '{label}'")]
pub struct ParseError {
    pub row: usize,
    pub label: String,
}

/// Anything [`crate::data::loader::load_file`] can fail with.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

// =============================================================================
// Request Validation Errors
// =============================================================================

/// A request built from the controls is not well formed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("year range start {start} must be before end {end}")]
    EmptyYearRange { start: i32, end: i32 },

    #[error("differencing order {0} is not one of 0, 1, 2")]
    UnsupportedDifferencingOrder(u8),

    #[error("{field} = {value} is outside 0..={max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("significance level {0} is not one of 0.01, 0.05, 0.1")]
    UnsupportedSignificance(f64),
}
