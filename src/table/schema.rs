//! Column type declarations.

use super::ColumnType;
use std::collections::HashMap;

/// Well-known column names of the TMDb export and of derived columns.
pub mod col {
    pub const ID: &str = "id";
    pub const IMDB_ID: &str = "imdb_id";
    pub const POPULARITY: &str = "popularity";
    pub const BUDGET: &str = "budget";
    pub const REVENUE: &str = "revenue";
    pub const ORIGINAL_TITLE: &str = "original_title";
    pub const CAST: &str = "cast";
    pub const HOMEPAGE: &str = "homepage";
    pub const DIRECTOR: &str = "director";
    pub const TAGLINE: &str = "tagline";
    pub const KEYWORDS: &str = "keywords";
    pub const OVERVIEW: &str = "overview";
    pub const RUNTIME: &str = "runtime";
    pub const GENRES: &str = "genres";
    pub const PRODUCTION_COMPANIES: &str = "production_companies";
    pub const RELEASE_DATE: &str = "release_date";
    pub const VOTE_COUNT: &str = "vote_count";
    pub const VOTE_AVERAGE: &str = "vote_average";
    pub const RELEASE_YEAR: &str = "release_year";
    pub const BUDGET_ADJ: &str = "budget_adj";
    pub const REVENUE_ADJ: &str = "revenue_adj";

    pub const RELEASE_MONTH: &str = "release_month";
    pub const PROFITS: &str = "profits";
    pub const PROFITS_RATE: &str = "profits_rate";
    pub const RAW_PROFITS: &str = "raw_profits";
}

/// Declared column types. Columns not listed fall back to `default_type`.
#[derive(Debug, Clone)]
pub struct Schema {
    types: HashMap<String, ColumnType>,
    default_type: ColumnType,
}

impl Default for Schema {
    fn default() -> Self {
        Self::tmdb()
    }
}

impl Schema {
    /// A schema with no declarations; every column loads as text.
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
            default_type: ColumnType::Text,
        }
    }

    /// Column types of the TMDb movies export.
    pub fn tmdb() -> Self {
        use col::*;

        Self::empty()
            .with(ID, ColumnType::Integer)
            .with(IMDB_ID, ColumnType::Text)
            .with(POPULARITY, ColumnType::Float)
            .with(BUDGET, ColumnType::Float)
            .with(REVENUE, ColumnType::Float)
            .with(ORIGINAL_TITLE, ColumnType::Text)
            .with(CAST, ColumnType::List)
            .with(HOMEPAGE, ColumnType::Text)
            .with(DIRECTOR, ColumnType::List)
            .with(TAGLINE, ColumnType::Text)
            .with(KEYWORDS, ColumnType::List)
            .with(OVERVIEW, ColumnType::Text)
            .with(RUNTIME, ColumnType::Integer)
            .with(GENRES, ColumnType::List)
            .with(PRODUCTION_COMPANIES, ColumnType::List)
            .with(RELEASE_DATE, ColumnType::Text)
            .with(VOTE_COUNT, ColumnType::Integer)
            .with(VOTE_AVERAGE, ColumnType::Float)
            .with(RELEASE_YEAR, ColumnType::Integer)
            .with(BUDGET_ADJ, ColumnType::Float)
            .with(REVENUE_ADJ, ColumnType::Float)
    }

    /// Declare (or redeclare) a column's type.
    pub fn with(mut self, name: &str, ty: ColumnType) -> Self {
        self.types.insert(name.to_string(), ty);
        self
    }

    pub fn type_of(&self, name: &str) -> ColumnType {
        self.types.get(name).copied().unwrap_or(self.default_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmdb_schema() {
        let schema = Schema::tmdb();
        assert_eq!(schema.type_of(col::GENRES), ColumnType::List);
        assert_eq!(schema.type_of(col::VOTE_COUNT), ColumnType::Integer);
        assert_eq!(schema.type_of(col::BUDGET_ADJ), ColumnType::Float);
        assert_eq!(schema.type_of("something_else"), ColumnType::Text);
    }

    #[test]
    fn test_redeclare() {
        let schema = Schema::empty().with("x", ColumnType::Float).with("x", ColumnType::Integer);
        assert_eq!(schema.type_of("x"), ColumnType::Integer);
    }
}
