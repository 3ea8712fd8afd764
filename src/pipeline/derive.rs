//! Derived profit metrics.

use crate::error::TableResult;
use crate::table::schema::col;
use crate::table::MovieTable;
use polars::prelude::*;
use tracing::{debug, warn};

const STEP: &str = "derive";

/// Result of deriving profit columns.
#[derive(Debug, Clone)]
pub struct DerivedOutcome {
    pub table: MovieTable,
    /// Rows whose profit rate is infinite or NaN (zero adjusted budget).
    pub non_finite_rates: usize,
}

/// Add `profits` and `profits_rate` from the inflation-adjusted revenue and
/// budget, dropping both source columns. When the raw `revenue` and `budget`
/// columns exist, `raw_profits` is added too and the raw columns are kept.
///
/// A zero budget is not an error: the rate follows IEEE division and
/// becomes `inf`, `-inf` or `NaN`.
pub fn derive_profits(table: MovieTable) -> TableResult<DerivedOutcome> {
    table.require_numeric(col::REVENUE_ADJ, STEP)?;
    table.require_numeric(col::BUDGET_ADJ, STEP)?;

    let revenue = col(col::REVENUE_ADJ).cast(DataType::Float64);
    let budget = col(col::BUDGET_ADJ).cast(DataType::Float64);
    let mut derived = vec![
        (revenue.clone() - budget.clone()).alias(col::PROFITS),
        (revenue / budget).alias(col::PROFITS_RATE),
    ];

    let has_raw = [col::REVENUE, col::BUDGET]
        .iter()
        .all(|name| table.require_numeric(name, STEP).is_ok());
    if has_raw {
        derived.push(
            (col(col::REVENUE).cast(DataType::Float64) - col(col::BUDGET).cast(DataType::Float64))
                .alias(col::RAW_PROFITS),
        );
    } else {
        debug!("Raw revenue/budget not available, skipping {}", col::RAW_PROFITS);
    }

    let table = MovieTable::from(table.lazy().with_columns(derived).collect()?)
        .without_columns(&[col::REVENUE_ADJ, col::BUDGET_ADJ]);

    let non_finite_rates = table
        .frame()
        .column(col::PROFITS_RATE)?
        .f64()?
        .into_iter()
        .flatten()
        .filter(|r| !r.is_finite())
        .count();
    if non_finite_rates > 0 {
        warn!(
            "{} rows have a zero {}; their {} is not finite",
            non_finite_rates,
            col::BUDGET_ADJ,
            col::PROFITS_RATE
        );
    }

    Ok(DerivedOutcome {
        table,
        non_finite_rates,
    })
}
