//! In-memory movie table.
//!
//! A `MovieTable` wraps a polars `DataFrame` whose column types were fixed by
//! the [`Schema`] at load time. Multi-valued fields such as genres are held
//! as `List(String)` columns. Missing cells are nulls until the cleaner
//! fills them.

pub mod loader;
pub mod schema;

pub use loader::TableLoader;
pub use schema::Schema;

use crate::error::{TableError, TableResult};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between labels in a multi-valued cell.
pub const LABEL_DELIMITER: &str = "|";

/// String form of a missing cell when it is coerced to a label.
pub const MISSING_LABEL: &str = "nan";

/// Semantic type of a column, declared once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    /// Delimiter-joined labels, stored split.
    List,
}

impl ColumnType {
    /// Classify a polars dtype.
    pub fn of(dtype: &DataType) -> Self {
        if dtype.is_integer() {
            ColumnType::Integer
        } else if dtype.is_float() {
            ColumnType::Float
        } else if matches!(dtype, DataType::List(_)) {
            ColumnType::List
        } else {
            ColumnType::Text
        }
    }

    /// The polars dtype a column of this type is stored as.
    pub fn dtype(self) -> DataType {
        match self {
            ColumnType::Integer => DataType::Int64,
            ColumnType::Float => DataType::Float64,
            ColumnType::Text => DataType::String,
            ColumnType::List => DataType::List(Box::new(DataType::String)),
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::List => write!(f, "list"),
        }
    }
}

/// Ordered, column-typed movie table.
#[derive(Debug, Clone, Default)]
pub struct MovieTable {
    df: DataFrame,
}

impl From<DataFrame> for MovieTable {
    fn from(df: DataFrame) -> Self {
        Self { df }
    }
}

impl MovieTable {
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_frame(self) -> DataFrame {
        self.df
    }

    /// A lazy query over a copy of this table.
    pub fn lazy(&self) -> LazyFrame {
        self.df.clone().lazy()
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn column_count(&self) -> usize {
        self.df.width()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.df.get_column_names_str()
    }

    /// Every column with its semantic type, in table order.
    pub fn column_types(&self) -> Vec<(String, ColumnType)> {
        self.df
            .get_columns()
            .iter()
            .map(|c| (c.name().to_string(), ColumnType::of(c.dtype())))
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.df.column(name).ok().map(|c| ColumnType::of(c.dtype()))
    }

    /// Look up a column, failing with `ColumnNotFound` tagged with `step`.
    pub fn require(&self, name: &str, step: &'static str) -> TableResult<&Column> {
        self.df
            .column(name)
            .map_err(|_| TableError::missing(name, step))
    }

    /// Type of a numeric column, failing when absent or non-numeric.
    pub fn require_numeric(&self, name: &str, step: &'static str) -> TableResult<ColumnType> {
        let found = ColumnType::of(self.require(name, step)?.dtype());
        if !found.is_numeric() {
            return Err(TableError::TypeMismatch {
                column: name.to_string(),
                expected: "numeric",
                found,
                step,
            });
        }
        Ok(found)
    }

    /// A numeric column's values as floats.
    pub fn numeric_values(
        &self,
        name: &str,
        step: &'static str,
    ) -> TableResult<Vec<Option<f64>>> {
        self.require_numeric(name, step)?;
        let values = self.df.column(name)?.cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().collect())
    }

    /// Expression giving each row of `name` as a list of labels.
    ///
    /// List cells are used as they are. Other cells are cast to text and
    /// split on [`LABEL_DELIMITER`]; a missing non-list cell becomes
    /// [`MISSING_LABEL`].
    pub fn label_lists(&self, name: &str, step: &'static str) -> TableResult<Expr> {
        let expr = match ColumnType::of(self.require(name, step)?.dtype()) {
            ColumnType::List => col(name),
            _ => col(name)
                .cast(DataType::String)
                .fill_null(lit(MISSING_LABEL))
                .str()
                .split(lit(LABEL_DELIMITER)),
        };
        Ok(expr)
    }

    /// Return this table without the named columns. Unknown names are ignored.
    pub fn without_columns<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        for name in names {
            // Absent columns are skipped.
            let _ = self.df.drop_in_place(name.as_ref());
        }
        self
    }

    /// Total number of missing cells across all columns.
    pub fn missing_cells(&self) -> usize {
        self.df.get_columns().iter().map(|c| c.null_count()).sum()
    }

    /// The first occurrence of every distinct row, in table order.
    pub fn unique_rows(&self) -> TableResult<MovieTable> {
        let unique = self
            .df
            .unique_stable(None, UniqueKeepStrategy::First, None)?;
        Ok(unique.into())
    }

    /// Number of rows that exactly repeat an earlier row.
    pub fn duplicate_rows(&self) -> TableResult<usize> {
        Ok(self.row_count() - self.unique_rows()?.row_count())
    }
}

#[cfg(test)]
impl MovieTable {
    /// Labels of every row of `name`, for assertions.
    pub(crate) fn cell_labels(&self, name: &str) -> Vec<Vec<String>> {
        let expr = self.label_lists(name, "test").unwrap();
        let lists = self.lazy().select([expr]).collect().unwrap();
        lists
            .column(name)
            .unwrap()
            .list()
            .unwrap()
            .into_iter()
            .map(|cell| match cell {
                Some(labels) => labels
                    .str()
                    .unwrap()
                    .into_iter()
                    .map(|l| l.unwrap_or(MISSING_LABEL).to_string())
                    .collect(),
                None => vec![MISSING_LABEL.to_string()],
            })
            .collect()
    }

    /// Text cells of `name`, for assertions.
    pub(crate) fn text_cells(&self, name: &str) -> Vec<Option<String>> {
        self.df
            .column(name)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|s| s.map(String::from))
            .collect()
    }
}
