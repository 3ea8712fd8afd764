//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// MovieStat - exploratory analysis of TMDb movie exports
///
/// Cleans the movie table, derives profit metrics, counts which genres,
/// cast members, production companies and release months dominate the
/// most profitable and best-rated movies, and writes a report with charts.
///
/// Examples:
///   moviestat --input tmdb-movies.csv
///   moviestat --input tmdb-movies.csv --format json --output report.json
///   moviestat --input tmdb-movies.csv --no-charts --max-labels 5
///   moviestat --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Movie CSV file to analyze
    ///
    /// Defaults to the config file's `general.input` (tmdb-movies.csv).
    #[arg(short, long, value_name = "FILE", env = "MOVIESTAT_INPUT")]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Directory for rendered SVG charts
    #[arg(long, value_name = "DIR")]
    pub charts_dir: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Number of labels listed per study in the report
    #[arg(long, value_name = "COUNT")]
    pub max_labels: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .moviestat.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .moviestat.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.max_labels == Some(0) {
            return Err("Max labels must be at least 1".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Input path is not a file: {}", input.display()));
            }
        }

        if let Some(ref dir) = self.charts_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(format!(
                    "Charts path exists and is not a directory: {}",
                    dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
