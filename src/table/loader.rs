//! CSV ingestion into a typed `MovieTable`.
//!
//! Every field is read as text first, then cast to the type the `Schema`
//! declares. List columns are split on the label delimiter.

use super::{ColumnType, MovieTable, Schema, LABEL_DELIMITER};
use crate::error::{TableError, TableResult};
use polars::prelude::*;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Raw cell values treated as missing.
const MISSING_MARKERS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Name of the record counter used while locating unparseable cells.
const RECORD: &str = "__record";

/// Reads delimited files into a `MovieTable` according to a `Schema`.
#[derive(Debug, Clone)]
pub struct TableLoader {
    schema: Schema,
    delimiter: u8,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::new(Schema::tmdb())
    }
}

impl TableLoader {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load a table from a file on disk.
    pub fn load_path(&self, path: &Path) -> TableResult<MovieTable> {
        info!("Loading movie table from {}", path.display());
        let file = File::open(path)?;
        let raw = self.read_options().into_reader_with_file_handle(file).finish()?;
        self.apply_schema(raw)
    }

    /// Load a table from in-memory CSV with a header row.
    pub fn load_bytes(&self, bytes: &[u8]) -> TableResult<MovieTable> {
        let raw = self
            .read_options()
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()?;
        self.apply_schema(raw)
    }

    fn read_options(&self) -> CsvReadOptions {
        let nulls = MISSING_MARKERS.iter().map(|m| (*m).into()).collect();
        CsvReadOptions::default()
            .with_has_header(true)
            // All columns as String; types are applied afterwards.
            .with_infer_schema_length(Some(0))
            .with_parse_options(
                CsvParseOptions::default()
                    .with_separator(self.delimiter)
                    .with_missing_is_null(true)
                    .with_null_values(Some(NullValues::AllColumns(nulls))),
            )
    }

    /// Cast each raw text column to its declared type.
    fn apply_schema(&self, raw: DataFrame) -> TableResult<MovieTable> {
        let typed_columns: Vec<Expr> = raw
            .get_column_names_str()
            .into_iter()
            .filter_map(|name| match self.schema.type_of(name) {
                ColumnType::Text => None,
                ColumnType::List => Some(col(name).str().split(lit(LABEL_DELIMITER))),
                ty => Some(col(name).cast(ty.dtype())),
            })
            .collect();

        let typed = raw.clone().lazy().with_columns(typed_columns).collect()?;

        // A cast turns unparseable text into null.
        for (before, after) in raw.get_columns().iter().zip(typed.get_columns()) {
            if after.null_count() > before.null_count() {
                let name = before.name().as_str();
                return Err(first_unparsed(&raw, name, self.schema.type_of(name))?);
            }
        }

        debug!("Read {} rows x {} columns", typed.height(), typed.width());
        Ok(typed.into())
    }
}

/// Describe the first cell of `name` that does not parse as `expected`.
///
/// Records are numbered from 1 and do not count the header, so quoted
/// fields spanning several lines do not shift the number.
fn first_unparsed(raw: &DataFrame, name: &str, expected: ColumnType) -> TableResult<TableError> {
    let bad = raw
        .clone()
        .lazy()
        .with_row_index(RECORD, Some(1))
        .filter(
            col(name)
                .is_not_null()
                .and(col(name).cast(expected.dtype()).is_null()),
        )
        .select([col(RECORD).cast(DataType::Int64), col(name)])
        .limit(1)
        .collect()?;

    let record = bad.column(RECORD)?.i64()?.get(0).unwrap_or_default();
    let value = bad.column(name)?.str()?.get(0).unwrap_or_default();
    Ok(TableError::NumberParse {
        column: name.to_string(),
        record: usize::try_from(record).unwrap_or_default(),
        value: value.to_string(),
        expected,
    })
}
