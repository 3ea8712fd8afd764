//! Pairwise Pearson correlation over numeric columns.

use crate::error::TableResult;
use crate::table::MovieTable;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

const STEP: &str = "correlation";

/// Square correlation matrix; `values[i][j]` pairs `columns[i]` with `columns[j]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlation between two named columns, if both are in the matrix.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Pearson correlation of every pair of numeric columns.
pub fn correlation_matrix(table: &MovieTable) -> TableResult<CorrelationMatrix> {
    let columns: Vec<String> = table
        .column_types()
        .into_iter()
        .filter(|(_, ty)| ty.is_numeric())
        .map(|(name, _)| name)
        .collect();

    let values = columns
        .iter()
        .map(|x| columns.iter().map(|y| pearson(table, x, y)).collect())
        .collect::<TableResult<Vec<Vec<_>>>>()?;

    Ok(CorrelationMatrix { columns, values })
}

/// Pearson correlation of two columns over the rows where both are finite.
///
/// `None` when fewer than two such rows exist or either side is constant.
pub fn pearson(table: &MovieTable, x: &str, y: &str) -> TableResult<Option<f64>> {
    table.require_numeric(x, STEP)?;
    table.require_numeric(y, STEP)?;

    let r = table
        .lazy()
        .select([
            col(x).cast(DataType::Float64).alias("x"),
            col(y).cast(DataType::Float64).alias("y"),
        ])
        .filter(col("x").is_finite().and(col("y").is_finite()))
        .select([pearson_corr(col("x"), col("y")).alias("r")])
        .collect()?;

    Ok(r.column("r")?.f64()?.get(0).filter(|r| r.is_finite()))
}
