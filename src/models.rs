//! Data models for the analysis report.
//!
//! This module contains the structures a run produces and the report
//! generator renders: metadata, study results, and chart references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::{CorrelationMatrix, FrequencyReport, LabelCount, YearPoint};
use crate::config::StudySpec;
use crate::table::ColumnType;

/// Research question a study belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Question {
    /// Which criteria go with high profits.
    CommercialSuccess,
    /// Which criteria go with high ratings.
    Popularity,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Question::CommercialSuccess => write!(f, "Commercial Success"),
            Question::Popularity => write!(f, "Popularity"),
        }
    }
}

/// Result of one top-N frequency study.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyResult {
    /// Column the rows were ranked by.
    pub rank_by: String,
    /// Requested sample size.
    pub top_n: usize,
    /// Column whose labels were counted.
    pub category: String,
    /// Rows actually sampled (`top_n` clamped to the table).
    pub rows_sampled: usize,
    /// Number of distinct labels.
    pub distinct_labels: usize,
    /// Total labels counted.
    pub total_labels: usize,
    /// Most frequent labels, truncated for display.
    pub top: Vec<LabelCount>,
}

impl StudyResult {
    /// Build a result from a frequency report, keeping `max_labels` entries.
    pub fn new(
        spec: &StudySpec,
        rows_sampled: usize,
        report: &FrequencyReport,
        max_labels: usize,
    ) -> Self {
        Self {
            rank_by: spec.rank_by.clone(),
            top_n: spec.top_n,
            category: spec.category.clone(),
            rows_sampled,
            distinct_labels: report.len(),
            total_labels: report.total(),
            top: report.head(max_labels).to_vec(),
        }
    }

    /// Short heading, e.g. "genres: top 50 by profits".
    pub fn title(&self) -> String {
        format!("{}: top {} by {}", self.category, self.top_n, self.rank_by)
    }
}

/// Label counts among the loved movies for one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularityResult {
    pub category: String,
    pub distinct_labels: usize,
    pub total_labels: usize,
    pub top: Vec<LabelCount>,
}

impl PopularityResult {
    pub fn new(category: &str, report: &FrequencyReport, max_labels: usize) -> Self {
        Self {
            category: category.to_string(),
            distinct_labels: report.len(),
            total_labels: report.total(),
            top: report.head(max_labels).to_vec(),
        }
    }
}

/// Loved movie selection parameters and the resulting counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularitySection {
    pub min_votes: f64,
    pub sample_size: usize,
    /// Movies remaining after all filters.
    pub movies: usize,
    pub results: Vec<PopularityResult>,
}

/// Shape and quality of the table before and after cleaning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub rows_loaded: usize,
    pub columns_loaded: usize,
    pub missing_cells: usize,
    /// Rows of the loaded table that repeat an earlier row exactly.
    pub exact_duplicates: usize,
    pub dropped_columns: Vec<String>,
    /// Duplicates removed by cleaning, including rows that only became
    /// equal once filled.
    pub duplicates_removed: usize,
    /// Missing cells replaced by a sentinel.
    pub cells_filled: usize,
    pub rows_analyzed: usize,
    /// Final columns and their types.
    pub columns: Vec<(String, ColumnType)>,
    /// Rows whose profit rate is infinite or NaN.
    pub non_finite_profit_rates: usize,
}

/// A rendered chart file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartFile {
    pub title: String,
    pub path: String,
    /// Points drawn (non-finite points are skipped).
    pub points: usize,
}

/// Metadata about the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Input file analyzed.
    pub input: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub overview: DatasetOverview,
    /// Commercial success studies in configured order.
    pub studies: Vec<StudyResult>,
    pub popularity: PopularitySection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationMatrix>,
    /// Mean raw profit per release year.
    pub yearly_profits: Vec<YearPoint>,
    pub charts: Vec<ChartFile>,
}
