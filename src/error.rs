//! Error types for table loading, cleaning and aggregation.

use std::io;

use polars::error::PolarsError;
use thiserror::Error;

use crate::table::ColumnType;

/// Failures raised by the table pipeline and the aggregator.
///
/// Every variant that concerns a column carries the pipeline step it
/// happened in, so the message alone tells the user where to look.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("[{step}] column '{column}' not found in table")]
    ColumnNotFound { column: String, step: &'static str },

    #[error("[{step}] column '{column}' has type {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: ColumnType,
        step: &'static str,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("[clean] cannot parse '{value}' in column '{column}' (row {row}) as a date")]
    DateParse {
        column: String,
        row: usize,
        value: String,
    },

    #[error("[load] cannot parse '{value}' in '{column}' (record {record}) as {expected}")]
    NumberParse {
        column: String,
        record: usize,
        value: String,
        expected: ColumnType,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl TableError {
    pub fn missing(column: &str, step: &'static str) -> Self {
        TableError::ColumnNotFound {
            column: column.to_string(),
            step,
        }
    }
}

pub type TableResult<T> = Result<T, TableError>;
