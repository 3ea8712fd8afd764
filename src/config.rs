//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.moviestat.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analysis::PopularityOptions;
use crate::pipeline::CleanOptions;
use crate::table::schema::col;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".moviestat.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Cleaning settings.
    #[serde(default)]
    pub cleaning: CleaningConfig,

    /// Commercial success studies.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Popularity studies.
    #[serde(default)]
    pub popularity: PopularityConfig,

    /// Chart settings.
    #[serde(default)]
    pub charts: ChartsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Input CSV file.
    #[serde(default = "default_input")]
    pub input: String,

    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Field separator of the input file.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            delimiter: default_delimiter(),
            verbose: false,
        }
    }
}

fn default_input() -> String {
    "tmdb-movies.csv".to_string()
}

fn default_output() -> String {
    "moviestat_report.md".to_string()
}

fn default_delimiter() -> char {
    ','
}

/// Table cleaning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Columns removed before analysis.
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,

    /// Value written into missing text cells.
    #[serde(default)]
    pub text_sentinel: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            drop_columns: default_drop_columns(),
            text_sentinel: String::new(),
        }
    }
}

fn default_drop_columns() -> Vec<String> {
    CleanOptions::default().drop_columns
}

/// One top-N study: rank by `rank_by`, keep `top_n` rows, count `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySpec {
    pub rank_by: String,
    pub top_n: usize,
    pub category: String,
}

impl StudySpec {
    pub fn new(rank_by: &str, top_n: usize, category: &str) -> Self {
        Self {
            rank_by: rank_by.to_string(),
            top_n,
            category: category.to_string(),
        }
    }
}

/// Commercial success analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// First and last year of the yearly profit series.
    #[serde(default = "default_year_range")]
    pub year_range: (i64, i64),

    /// Studies run in order.
    #[serde(default = "default_studies")]
    pub studies: Vec<StudySpec>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            year_range: default_year_range(),
            studies: default_studies(),
        }
    }
}

fn default_studies() -> Vec<StudySpec> {
    let mut studies = Vec::new();
    for category in [col::GENRES, col::CAST, col::PRODUCTION_COMPANIES] {
        for rank_by in [col::PROFITS, col::PROFITS_RATE] {
            for top_n in [50, 1000] {
                studies.push(StudySpec::new(rank_by, top_n, category));
            }
        }
    }
    studies.push(StudySpec::new(col::PROFITS, 50, col::RELEASE_MONTH));
    studies.push(StudySpec::new(col::PROFITS_RATE, 100, col::RELEASE_MONTH));
    studies
}

fn default_year_range() -> (i64, i64) {
    (1955, 2025)
}

/// Popularity analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularityConfig {
    /// Minimum vote count for a movie to be considered.
    #[serde(default = "default_min_votes")]
    pub min_votes: f64,

    /// Number of best-rated movies kept.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Columns whose labels are counted among the loved movies.
    #[serde(default = "default_popularity_categories")]
    pub categories: Vec<String>,
}

impl Default for PopularityConfig {
    fn default() -> Self {
        Self {
            min_votes: default_min_votes(),
            sample_size: default_sample_size(),
            categories: default_popularity_categories(),
        }
    }
}

fn default_min_votes() -> f64 {
    1000.0
}

fn default_sample_size() -> usize {
    1000
}

fn default_popularity_categories() -> Vec<String> {
    [col::PRODUCTION_COMPANIES, col::CAST, col::GENRES]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Chart rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    /// Render charts at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory the SVG files are written to.
    #[serde(default = "default_charts_dir")]
    pub directory: String,

    /// Chart width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Chart height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: default_charts_dir(),
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_charts_dir() -> String {
    "charts".to_string()
}

fn default_width() -> u32 {
    1000
}

fn default_height() -> u32 {
    800
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Labels listed per study.
    #[serde(default = "default_max_labels")]
    pub max_labels: usize,

    /// Include the correlation matrix section.
    #[serde(default = "default_true")]
    pub include_correlation: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_labels: default_max_labels(),
            include_correlation: true,
        }
    }
}

fn default_max_labels() -> usize {
    10
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.general.input = input.display().to_string();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(ref dir) = args.charts_dir {
            self.charts.directory = dir.display().to_string();
        }
        if let Some(max_labels) = args.max_labels {
            self.report.max_labels = max_labels;
        }

        // Flags always override
        if args.no_charts {
            self.charts.enabled = false;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Validate values that serde cannot check.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(study) = self.analysis.studies.iter().find(|s| s.top_n == 0) {
            return Err(format!(
                "Study '{} by {}' must have top_n of at least 1",
                study.category, study.rank_by
            ));
        }
        if self.popularity.sample_size == 0 {
            return Err("Popularity sample_size must be at least 1".to_string());
        }
        if self.analysis.year_range.0 > self.analysis.year_range.1 {
            return Err("Year range must be ascending".to_string());
        }
        if !self.general.delimiter.is_ascii() {
            return Err("Delimiter must be a single ASCII character".to_string());
        }
        if self.charts.width == 0 || self.charts.height == 0 {
            return Err("Chart dimensions must be positive".to_string());
        }
        Ok(())
    }

    /// Options for the cleaning stage.
    pub fn clean_options(&self) -> CleanOptions {
        CleanOptions {
            drop_columns: self.cleaning.drop_columns.clone(),
            text_sentinel: self.cleaning.text_sentinel.clone(),
            ..CleanOptions::default()
        }
    }

    /// Options for the popularity selection.
    pub fn popularity_options(&self) -> PopularityOptions {
        PopularityOptions {
            min_votes: self.popularity.min_votes,
            sample_size: self.popularity.sample_size,
            missing_sentinel: self.cleaning.text_sentinel.clone(),
            ..PopularityOptions::default()
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
