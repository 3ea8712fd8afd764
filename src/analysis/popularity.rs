//! Selection of well-rated ("loved") movies.

use super::aggregator::top_rows;
use crate::error::TableResult;
use crate::table::schema::col;
use crate::table::MovieTable;
use polars::prelude::*;
use tracing::debug;

const STEP: &str = "popularity";

/// Settings for [`select_loved_movies`].
#[derive(Debug, Clone)]
pub struct PopularityOptions {
    /// Movies with fewer votes are ignored.
    pub min_votes: f64,
    /// How many of the best-rated movies to keep.
    pub sample_size: usize,
    pub vote_count_column: String,
    pub rank_by: String,
    pub company_column: String,
    /// Movies whose only company label equals this are excluded.
    pub missing_sentinel: String,
}

impl Default for PopularityOptions {
    fn default() -> Self {
        Self {
            min_votes: 1000.0,
            sample_size: 1000,
            vote_count_column: col::VOTE_COUNT.to_string(),
            rank_by: col::VOTE_AVERAGE.to_string(),
            company_column: col::PRODUCTION_COMPANIES.to_string(),
            missing_sentinel: String::new(),
        }
    }
}

/// Movies with at least `min_votes` votes, the `sample_size` best by
/// `rank_by`, minus those with no known production company.
pub fn select_loved_movies(
    table: &MovieTable,
    options: &PopularityOptions,
) -> TableResult<MovieTable> {
    table.require_numeric(&options.vote_count_column, STEP)?;
    let voted: MovieTable = table
        .lazy()
        .filter(
            col(options.vote_count_column.as_str())
                .cast(DataType::Float64)
                .gt_eq(lit(options.min_votes)),
        )
        .collect()?
        .into();
    debug!(
        "{} of {} movies have at least {} votes",
        voted.row_count(),
        table.row_count(),
        options.min_votes
    );

    let best = top_rows(&voted, &options.rank_by, options.sample_size)?;

    let companies = best.label_lists(&options.company_column, STEP)?;
    let unknown_company = companies
        .clone()
        .list()
        .len()
        .eq(lit(1))
        .and(companies.list().first().eq(lit(options.missing_sentinel.as_str())))
        .fill_null(lit(false));
    let loved: MovieTable = best.lazy().filter(unknown_company.not()).collect()?.into();
    debug!("{} loved movies after excluding unknown companies", loved.row_count());

    Ok(loved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;
    use crate::pipeline::cleaner::fill_missing;
    use crate::table::TableLoader;

    const MOVIES: &str = "\
vote_count,vote_average,production_companies
5000,7.0,Warner Bros.
10,9.9,Tiny
2000,8.0,Universal Pictures|Amblin
1000,6.0,Paramount Pictures
3000,8.5,
";

    fn table() -> MovieTable {
        let raw = TableLoader::default().load_bytes(MOVIES.as_bytes()).unwrap();
        fill_missing(raw, "").unwrap().0
    }

    #[test]
    fn test_select_loved_movies() {
        let options = PopularityOptions {
            sample_size: 3,
            ..PopularityOptions::default()
        };
        let loved = select_loved_movies(&table(), &options).unwrap();

        // Top 3 by rating among well-voted: 8.5 (no company), 8.0, 7.0.
        assert_eq!(loved.row_count(), 2);
        assert_eq!(
            loved.numeric_values(col::VOTE_AVERAGE, "test").unwrap(),
            vec![Some(8.0), Some(7.0)]
        );
    }

    #[test]
    fn test_custom_sentinel_is_excluded() {
        let raw = TableLoader::default().load_bytes(MOVIES.as_bytes()).unwrap();
        let filled = fill_missing(raw, "none").unwrap().0;
        let options = PopularityOptions {
            missing_sentinel: "none".to_string(),
            ..PopularityOptions::default()
        };
        let loved = select_loved_movies(&filled, &options).unwrap();
        assert_eq!(loved.row_count(), 3);
        assert_eq!(
            loved.cell_labels(col::PRODUCTION_COMPANIES),
            vec![
                vec!["Universal Pictures", "Amblin"],
                vec!["Warner Bros."],
                vec!["Paramount Pictures"],
            ]
        );
    }

    #[test]
    fn test_zero_sample_rejected() {
        let options = PopularityOptions {
            sample_size: 0,
            ..PopularityOptions::default()
        };
        assert!(matches!(
            select_loved_movies(&table(), &options),
            Err(TableError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_missing_company_column() {
        let t = table().without_columns(&[col::PRODUCTION_COMPANIES]);
        assert!(matches!(
            select_loved_movies(&t, &PopularityOptions::default()),
            Err(TableError::ColumnNotFound { .. })
        ));
    }
}
