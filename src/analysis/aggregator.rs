//! Top-N category frequency aggregation.
//!
//! This module ranks movies by a numeric column, keeps the best N rows and
//! counts how often each label of a multi-valued column occurs among them.

use crate::error::{TableError, TableResult};
use crate::table::{MovieTable, MISSING_LABEL};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

const STEP: &str = "aggregate";

const LABEL: &str = "label";
const COUNT: &str = "count";

/// One label and the number of times it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Label counts ordered by count descending, ties in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyReport {
    entries: Vec<LabelCount>,
}

impl FrequencyReport {
    /// Read a frame of `label`/`count` columns, already in report order.
    fn from_frame(counted: &DataFrame) -> TableResult<Self> {
        let labels = counted.column(LABEL)?.str()?;
        let counts = counted.column(COUNT)?.i64()?;
        let entries = labels
            .into_iter()
            .zip(counts.into_iter())
            .map(|(label, count)| LabelCount {
                label: label.unwrap_or(MISSING_LABEL).to_string(),
                count: count.and_then(|c| usize::try_from(c).ok()).unwrap_or(0),
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[LabelCount] {
        &self.entries
    }

    /// The `n` most frequent labels.
    pub fn head(&self, n: usize) -> &[LabelCount] {
        let entries = self.entries();
        &entries[..n.min(entries.len())]
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries().iter().map(|e| e.count).sum()
    }
}

/// Sort options for ranking: descending, missing last, ties in input order.
fn rank_order() -> SortMultipleOptions {
    SortMultipleOptions::default()
        .with_order_descending(true)
        .with_nulls_last(true)
        .with_maintain_order(true)
}

/// The `n` best rows by `rank_by` as a new table.
///
/// NaN ranks with the missing values, after every number. `n` larger than
/// the table is clamped to the row count.
pub fn top_rows(table: &MovieTable, rank_by: &str, n: usize) -> TableResult<MovieTable> {
    if n == 0 {
        return Err(TableError::InvalidArgument(format!(
            "top-N sample size for '{}' must be at least 1",
            rank_by
        )));
    }
    table.require_numeric(rank_by, STEP)?;

    let key = col(rank_by).cast(DataType::Float64).fill_nan(lit(NULL));
    let limit = IdxSize::try_from(n.min(table.row_count())).unwrap_or(IdxSize::MAX);
    let top = table
        .lazy()
        .sort_by_exprs([key], rank_order())
        .limit(limit)
        .collect()?;
    Ok(top.into())
}

/// Count the labels of `category` among the `top_n` rows ranked by `rank_by`.
///
/// The table is not modified.
pub fn aggregate(
    table: &MovieTable,
    rank_by: &str,
    top_n: usize,
    category: &str,
) -> TableResult<FrequencyReport> {
    table.require(category, STEP)?;
    let top = top_rows(table, rank_by, top_n)?;
    count_labels(&top, category)
}

/// Count the labels of `category` over every row.
///
/// Counts are ordered descending; equal counts keep the order in which
/// their label first appears.
pub fn count_labels(table: &MovieTable, category: &str) -> TableResult<FrequencyReport> {
    let labels = table
        .label_lists(category, STEP)?
        .explode()
        .fill_null(lit(MISSING_LABEL))
        .alias(LABEL);

    let counted = table
        .lazy()
        .select([labels])
        .group_by_stable([col(LABEL)])
        .agg([len().cast(DataType::Int64).alias(COUNT)])
        .sort([COUNT], rank_order())
        .collect()?;
    FrequencyReport::from_frame(&counted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnType;

    fn scenario() -> MovieTable {
        df!(
            "genres" => ["Drama|Comedy", "Drama", "Action"],
            "profits" => [300.0, 200.0, 100.0],
        )
        .unwrap()
        .into()
    }

    fn counts(report: &FrequencyReport) -> Vec<(&str, usize)> {
        report
            .entries()
            .iter()
            .map(|e| (e.label.as_str(), e.count))
            .collect()
    }

    #[test]
    fn test_top_two_by_profit() {
        let report = aggregate(&scenario(), "profits", 2, "genres").unwrap();
        assert_eq!(counts(&report), vec![("Drama", 2), ("Comedy", 1)]);
    }

    #[test]
    fn test_counts_sum_to_label_total() {
        let table = scenario();
        for n in 1..=3 {
            let report = aggregate(&table, "profits", n, "genres").unwrap();
            let expected: usize = top_rows(&table, "profits", n)
                .unwrap()
                .cell_labels("genres")
                .iter()
                .map(Vec::len)
                .sum();
            assert_eq!(report.total(), expected);
        }
    }

    #[test]
    fn test_idempotent_and_non_mutating() {
        let table = scenario();
        let before = table.clone();
        let first = aggregate(&table, "profits", 2, "genres").unwrap();
        let second = aggregate(&table, "profits", 2, "genres").unwrap();
        assert_eq!(first, second);
        assert!(table.frame().equals_missing(before.frame()));
    }

    #[test]
    fn test_top_n_is_clamped() {
        let table = scenario();
        let all = aggregate(&table, "profits", 3, "genres").unwrap();
        let more = aggregate(&table, "profits", 1000, "genres").unwrap();
        assert_eq!(all, more);
        assert_eq!(counts(&all), vec![("Drama", 2), ("Comedy", 1), ("Action", 1)]);
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let err = aggregate(&scenario(), "profits", 0, "genres").unwrap_err();
        assert!(matches!(err, TableError::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_columns() {
        let table = scenario();
        assert!(matches!(
            aggregate(&table, "revenue", 2, "genres"),
            Err(TableError::ColumnNotFound { .. })
        ));
        assert!(matches!(
            aggregate(&table, "profits", 2, "cast"),
            Err(TableError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_non_numeric_rank_column() {
        let err = aggregate(&scenario(), "genres", 2, "genres").unwrap_err();
        assert!(matches!(
            err,
            TableError::TypeMismatch {
                found: ColumnType::Text,
                ..
            }
        ));
    }

    #[test]
    fn test_equal_ranks_keep_input_order() {
        let table: MovieTable = df!(
            "order" => [0i64, 1, 2, 3, 4, 5],
            "score" => [1.0, 5.0, 1.0, 5.0, f64::NAN, 5.0],
        )
        .unwrap()
        .into();

        let top = top_rows(&table, "score", 6).unwrap();
        assert_eq!(
            top.numeric_values("order", "test").unwrap(),
            vec![Some(1.0), Some(3.0), Some(5.0), Some(0.0), Some(2.0), Some(4.0)]
        );

        let report = aggregate(&table, "score", 2, "order").unwrap();
        assert_eq!(counts(&report), vec![("1", 1), ("3", 1)]);
    }

    #[test]
    fn test_missing_and_infinite_ranks() {
        let table: MovieTable = df!(
            "order" => [0i64, 1, 2, 3],
            "score" => [Some(1.0), None, Some(f64::INFINITY), Some(f64::NEG_INFINITY)],
        )
        .unwrap()
        .into();

        let top = top_rows(&table, "score", 4).unwrap();
        assert_eq!(
            top.numeric_values("order", "test").unwrap(),
            vec![Some(2.0), Some(0.0), Some(3.0), Some(1.0)]
        );
    }

    #[test]
    fn test_ties_in_counts_keep_first_seen_order() {
        let table: MovieTable = df!("tag" => ["b", "a", "c", "a", "b", "d"]).unwrap().into();
        let report = count_labels(&table, "tag").unwrap();
        assert_eq!(counts(&report), vec![("b", 2), ("a", 2), ("c", 1), ("d", 1)]);
    }

    #[test]
    fn test_numeric_category_is_coerced() {
        let table: MovieTable = df!(
            "release_month" => [6i64, 12, 6],
            "profits" => [1.0, 2.0, 3.0],
        )
        .unwrap()
        .into();
        let report = aggregate(&table, "profits", 3, "release_month").unwrap();
        assert_eq!(counts(&report), vec![("6", 2), ("12", 1)]);
    }

    #[test]
    fn test_empty_and_sentinel_labels_are_counted() {
        let table: MovieTable = df!("genres" => ["", "Drama|"]).unwrap().into();
        let report = count_labels(&table, "genres").unwrap();
        assert_eq!(counts(&report), vec![("", 2), ("Drama", 1)]);
    }

    #[test]
    fn test_list_column_counts() {
        let csv = "genres,profits\nAction|Drama,2\nDrama,1\n";
        let table = crate::table::TableLoader::default()
            .load_bytes(csv.as_bytes())
            .unwrap();
        assert_eq!(table.column_type("genres"), Some(ColumnType::List));

        let report = count_labels(&table, "genres").unwrap();
        assert_eq!(counts(&report), vec![("Drama", 2), ("Action", 1)]);
    }

    #[test]
    fn test_head() {
        let table: MovieTable = df!("tag" => ["x", "y", "x"]).unwrap().into();
        let report = count_labels(&table, "tag").unwrap();
        assert_eq!(report.head(1).len(), 1);
        assert_eq!(report.head(10).len(), 2);
        assert_eq!(report.len(), 2);
    }
}
