//! Table cleaning: column drops, missing-value fill, release month
//! extraction and de-duplication.

use crate::error::{TableError, TableResult};
use crate::table::schema::col;
use crate::table::{ColumnType, MovieTable, LABEL_DELIMITER};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::{debug, info, warn};

const STEP: &str = "clean";

/// Date layouts accepted for the release date column.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

/// Settings for [`clean`].
#[derive(Debug, Clone)]
pub struct CleanOptions {
    /// Columns removed before anything else.
    pub drop_columns: Vec<String>,
    /// Value written into missing text and list cells.
    pub text_sentinel: String,
    /// Column holding the release date.
    pub date_column: String,
    /// Column the release month is written to.
    pub month_column: String,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            drop_columns: [
                col::ID,
                col::IMDB_ID,
                col::HOMEPAGE,
                col::TAGLINE,
                col::OVERVIEW,
                col::KEYWORDS,
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            text_sentinel: String::new(),
            date_column: col::RELEASE_DATE.to_string(),
            month_column: col::RELEASE_MONTH.to_string(),
        }
    }
}

/// Result of cleaning a table.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub table: MovieTable,
    /// Columns from `drop_columns` that were actually present.
    pub dropped_columns: Vec<String>,
    pub duplicates_removed: usize,
    pub cells_filled: usize,
}

/// Clean a freshly loaded table.
///
/// After a successful run the table has no missing cells, no duplicate
/// rows, and an integer month column in place of the date column.
/// Duplicates are removed last, so rows that only become equal once filled
/// or reduced to a month are removed too.
pub fn clean(table: MovieTable, options: &CleanOptions) -> TableResult<CleanOutcome> {
    let dropped_columns: Vec<String> = options
        .drop_columns
        .iter()
        .filter(|name| table.has_column(name))
        .cloned()
        .collect();
    for name in &options.drop_columns {
        if !dropped_columns.contains(name) {
            warn!("Column '{}' not present, nothing to drop", name);
        }
    }
    let table = table.without_columns(&dropped_columns);

    let (table, cells_filled) = fill_missing(table, &options.text_sentinel)?;
    debug!("Filled {} missing cells", cells_filled);

    let table = extract_month(table, &options.date_column, &options.month_column)?;

    let (table, duplicates_removed) = drop_duplicates(table)?;
    if duplicates_removed > 0 {
        info!("Removed {} duplicate rows", duplicates_removed);
    }

    Ok(CleanOutcome {
        table,
        dropped_columns,
        duplicates_removed,
        cells_filled,
    })
}

/// Keep the first occurrence of each distinct row.
pub fn drop_duplicates(table: MovieTable) -> TableResult<(MovieTable, usize)> {
    let unique = table.unique_rows()?;
    let removed = table.row_count() - unique.row_count();
    Ok((unique, removed))
}

/// Replace every missing cell: numbers with zero, text with `sentinel`,
/// lists with `sentinel` split into labels.
pub fn fill_missing(table: MovieTable, sentinel: &str) -> TableResult<(MovieTable, usize)> {
    let filled = table.missing_cells();
    if filled == 0 {
        return Ok((table, 0));
    }

    let fills: Vec<Expr> = table
        .frame()
        .get_columns()
        .iter()
        .filter(|c| c.null_count() > 0)
        .map(|c| {
            let value = match ColumnType::of(c.dtype()) {
                ColumnType::Integer => lit(0i64),
                ColumnType::Float => lit(0.0),
                ColumnType::Text => lit(sentinel),
                ColumnType::List => lit(sentinel).str().split(lit(LABEL_DELIMITER)),
            };
            col(c.name().clone()).fill_null(value)
        })
        .collect();

    let filled_table = table.lazy().with_columns(fills).collect()?;
    Ok((filled_table.into(), filled))
}

/// Parse `date_column`, write its month to `month_column` and drop the
/// date column.
pub fn extract_month(
    table: MovieTable,
    date_column: &str,
    month_column: &str,
) -> TableResult<MovieTable> {
    let dates = table.require(date_column, STEP)?;
    let found = ColumnType::of(dates.dtype());
    if found != ColumnType::Text {
        return Err(TableError::TypeMismatch {
            column: date_column.to_string(),
            expected: "text",
            found,
            step: STEP,
        });
    }

    let months = dates
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, cell)| {
            let raw = cell.unwrap_or("");
            parse_date(raw)
                .map(|date| i64::from(date.month()))
                .ok_or_else(|| TableError::DateParse {
                    column: date_column.to_string(),
                    row: row + 1,
                    value: raw.to_string(),
                })
        })
        .collect::<TableResult<Vec<i64>>>()?;

    let mut df = table.without_columns(&[date_column]).into_frame();
    df.with_column(Series::new(month_column.into(), months))?;
    Ok(df.into())
}

/// Parse a date in any of the accepted layouts.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}
