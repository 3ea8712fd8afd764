//! Per-year averages.

use crate::error::TableResult;
use crate::table::MovieTable;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

const STEP: &str = "trend";

const YEAR: &str = "year";
const VALUE: &str = "value";
const MEAN: &str = "mean";
const MOVIES: &str = "movies";

/// Mean of a value for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearPoint {
    pub year: i64,
    pub mean: f64,
    pub movies: usize,
}

/// Mean of `value_column` per `year_column`, ascending by year, limited to
/// `years` (inclusive). Non-finite values are skipped.
pub fn yearly_mean(
    table: &MovieTable,
    year_column: &str,
    value_column: &str,
    years: (i64, i64),
) -> TableResult<Vec<YearPoint>> {
    table.require_numeric(year_column, STEP)?;
    table.require_numeric(value_column, STEP)?;

    let yearly = table
        .lazy()
        .select([
            col(year_column).cast(DataType::Int64).alias(YEAR),
            col(value_column).cast(DataType::Float64).alias(VALUE),
        ])
        .filter(
            col(YEAR)
                .gt_eq(lit(years.0))
                .and(col(YEAR).lt_eq(lit(years.1)))
                .and(col(VALUE).is_finite()),
        )
        .group_by([col(YEAR)])
        .agg([
            col(VALUE).mean().alias(MEAN),
            len().cast(DataType::Int64).alias(MOVIES),
        ])
        .sort([YEAR], SortMultipleOptions::default())
        .collect()?;

    let points = yearly
        .column(YEAR)?
        .i64()?
        .into_iter()
        .zip(yearly.column(MEAN)?.f64()?.into_iter())
        .zip(yearly.column(MOVIES)?.i64()?.into_iter())
        .filter_map(|((year, mean), movies)| {
            Some(YearPoint {
                year: year?,
                mean: mean?,
                movies: usize::try_from(movies?).ok()?,
            })
        })
        .collect();
    Ok(points)
}
