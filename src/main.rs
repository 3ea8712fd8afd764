//! MovieStat - exploratory analysis of TMDb movie exports
//!
//! A CLI tool that cleans a movie table, derives profit metrics and
//! reports which genres, cast members, production companies and release
//! months go with commercially successful and well-rated movies.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any failure (bad arguments, unreadable input, unknown column, ...)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod pipeline;
mod report;
mod table;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use models::{
    DatasetOverview, PopularityResult, PopularitySection, Report, ReportMetadata, StudyResult,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use table::schema::col;
use table::{MovieTable, Schema, TableLoader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("MovieStat v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_analysis(args) {
        error!("Analysis failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .moviestat.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize studies, cleaning, popularity filters and charts.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete load → clean → derive → analyze → report workflow.
fn run_analysis(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let input = PathBuf::from(&config.general.input);
    let spinner = progress_spinner(!args.quiet);

    // Step 1: Load the table
    spinner.set_message(format!("Loading {}", input.display()));
    let loader = TableLoader::new(Schema::tmdb()).with_delimiter(config.general.delimiter as u8);
    let raw = loader
        .load_path(&input)
        .with_context(|| format!("Failed to load movie table from {}", input.display()))?;
    info!("Loaded {} rows x {} columns", raw.row_count(), raw.column_count());

    let mut overview = DatasetOverview {
        rows_loaded: raw.row_count(),
        columns_loaded: raw.column_count(),
        missing_cells: raw.missing_cells(),
        exact_duplicates: raw.duplicate_rows().context("Duplicate detection failed")?,
        ..DatasetOverview::default()
    };

    // Step 2: Clean
    spinner.set_message("Cleaning table");
    let cleaned = pipeline::clean(raw, &config.clean_options()).context("Cleaning failed")?;
    overview.dropped_columns = cleaned.dropped_columns;
    overview.duplicates_removed = cleaned.duplicates_removed;
    overview.cells_filled = cleaned.cells_filled;

    // Step 3: Derive profit metrics
    spinner.set_message("Deriving profit metrics");
    let derived = pipeline::derive_profits(cleaned.table).context("Deriving profits failed")?;
    overview.non_finite_profit_rates = derived.non_finite_rates;
    let movies = derived.table;
    overview.rows_analyzed = movies.row_count();
    debug!("Analyzing columns: {:?}", movies.column_names());
    overview.columns = movies.column_types();
    spinner.finish_and_clear();

    // Step 4: Commercial success studies
    if !args.quiet {
        println!("💰 Running {} commercial success studies...", config.analysis.studies.len());
    }
    let studies = run_studies(&movies, &config)?;

    // Step 5: Popularity studies
    if !args.quiet {
        println!("⭐ Selecting well-rated movies...");
    }
    let loved = analysis::select_loved_movies(&movies, &config.popularity_options())
        .context("Popularity selection failed")?;
    let popularity = run_popularity(&loved, &config)?;

    // Step 6: Correlation and yearly trend
    let correlation = if config.report.include_correlation {
        Some(analysis::correlation_matrix(&movies).context("Correlation failed")?)
    } else {
        None
    };
    let yearly_profits = match analysis::yearly_mean(
        &movies,
        col::RELEASE_YEAR,
        col::RAW_PROFITS,
        config.analysis.year_range,
    ) {
        Ok(points) => points,
        Err(e) => {
            warn!("Skipping yearly profit series: {}", e);
            Vec::new()
        }
    };

    // Step 7: Charts
    let charts = if config.charts.enabled {
        if !args.quiet {
            println!("📈 Rendering charts to {}...", config.charts.directory);
        }
        let renderer = report::ChartRenderer::new(
            &config.charts.directory,
            (config.charts.width, config.charts.height),
        );
        report::render_report_charts(&renderer, &loved, &yearly_profits)
            .context("Chart rendering failed")?
    } else {
        debug!("Chart rendering disabled");
        Vec::new()
    };

    // Step 8: Build and save the report
    let report = Report {
        metadata: ReportMetadata {
            input: input.display().to_string(),
            analysis_date: Utc::now(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        overview,
        studies,
        popularity,
        correlation,
        yearly_profits,
        charts,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = PathBuf::from(&config.general.output);
    report::write_report(&output, &output_path)?;

    if !args.quiet {
        print_summary(&report);
        println!(
            "\n✅ Analysis complete! Report saved to: {}",
            output_path.display()
        );
    }

    Ok(())
}

/// Run every configured top-N study over the analyzed table.
fn run_studies(movies: &MovieTable, config: &Config) -> Result<Vec<StudyResult>> {
    config
        .analysis
        .studies
        .iter()
        .map(|spec| {
            let frequencies =
                analysis::aggregate(movies, &spec.rank_by, spec.top_n, &spec.category)
                    .with_context(|| {
                        format!(
                            "Study '{}' by '{}' (top {}) failed",
                            spec.category, spec.rank_by, spec.top_n
                        )
                    })?;
            let rows_sampled = spec.top_n.min(movies.row_count());
            debug!(
                "{} top {} by {}: {} labels",
                spec.category,
                spec.top_n,
                spec.rank_by,
                frequencies.total()
            );
            Ok(StudyResult::new(
                spec,
                rows_sampled,
                &frequencies,
                config.report.max_labels,
            ))
        })
        .collect()
}

/// Count labels among the loved movies for each configured column.
fn run_popularity(loved: &MovieTable, config: &Config) -> Result<PopularitySection> {
    let results = config
        .popularity
        .categories
        .iter()
        .map(|category| {
            let frequencies = analysis::count_labels(loved, category)
                .with_context(|| format!("Popularity count of '{}' failed", category))?;
            Ok(PopularityResult::new(
                category,
                &frequencies,
                config.report.max_labels,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PopularitySection {
        min_votes: config.popularity.min_votes,
        sample_size: config.popularity.sample_size,
        movies: loved.row_count(),
        results,
    })
}

/// Print a short summary of the headline findings.
fn print_summary(report: &Report) {
    println!("\n📊 Analysis Summary:");
    println!(
        "   Rows: {} loaded, {} duplicates removed, {} analyzed",
        report.overview.rows_loaded,
        report.overview.duplicates_removed,
        report.overview.rows_analyzed
    );
    for study in &report.studies {
        if let Some(leader) = study.top.first() {
            println!(
                "   - {}: {} ({})",
                study.title(),
                display_label(&leader.label),
                leader.count
            );
        }
    }
    for result in &report.popularity.results {
        if let Some(leader) = result.top.first() {
            println!(
                "   - loved {}: {} ({})",
                result.category,
                display_label(&leader.label),
                leader.count
            );
        }
    }
    if let Some(ref matrix) = report.correlation {
        for other in [col::VOTE_AVERAGE, col::PROFITS] {
            if let Some(r) = matrix.get(col::POPULARITY, other) {
                println!("   Correlation popularity ~ {}: {:.3}", other, r);
            }
        }
    }
    if !report.charts.is_empty() {
        println!("   Charts: {}", report.charts.len());
    }
    println!("   Duration: {:.1}s", report.metadata.duration_seconds);
}

fn display_label(label: &str) -> &str {
    if label.is_empty() {
        "(empty)"
    } else {
        label
    }
}

/// Spinner shown while the table is loaded and cleaned.
fn progress_spinner(show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOVIES: &str = "\
id,imdb_id,popularity,budget,revenue,original_title,cast,director,genres,production_companies,release_date,vote_count,vote_average,release_year,budget_adj,revenue_adj
1,tt1,32.9,150000000,1513528810,Jurassic World,Chris Pratt|Bryce Dallas Howard,Colin Trevorrow,Action|Adventure|Science Fiction,Universal Studios|Amblin Entertainment,6/9/15,5562,6.5,2015,137999939.3,1392445893
2,tt2,28.4,150000000,378436354,Mad Max: Fury Road,Tom Hardy|Charlize Theron,George Miller,Action|Adventure,Village Roadshow Pictures,5/13/15,6185,7.1,2015,137999939.3,348161292.5
3,tt3,13.1,110000000,295238201,Insurgent,Shailene Woodley|Theo James,Robert Schwentke,Adventure|Science Fiction,Summit Entertainment,3/18/15,2480,6.3,2015,101199955.5,271619025.4
3,tt3,13.1,110000000,295238201,Insurgent,Shailene Woodley|Theo James,Robert Schwentke,Adventure|Science Fiction,Summit Entertainment,3/18/15,2480,6.3,2015,101199955.5,271619025.4
4,tt4,0.5,0,0,Tiny Film,,Nobody,Drama,,12/25/14,10,8.0,2014,0,0
";

    fn config_for(dir: &Path) -> Config {
        let mut config = Config::default();
        config.general.input = dir.join("movies.csv").display().to_string();
        config.general.output = dir.join("report.md").display().to_string();
        config.charts.directory = dir.join("charts").display().to_string();
        config.popularity.min_votes = 1000.0;
        config
    }

    fn run_pipeline(config: &Config) -> MovieTable {
        let raw = TableLoader::default()
            .load_path(Path::new(&config.general.input))
            .unwrap();
        let cleaned = pipeline::clean(raw, &config.clean_options()).unwrap();
        pipeline::derive_profits(cleaned.table).unwrap().table
    }

    #[test]
    fn test_pipeline_and_studies() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("movies.csv"), MOVIES).unwrap();
        let config = config_for(dir.path());

        let movies = run_pipeline(&config);
        assert_eq!(movies.row_count(), 4);
        assert_eq!(movies.missing_cells(), 0);

        let studies = run_studies(&movies, &config).unwrap();
        assert_eq!(studies.len(), config.analysis.studies.len());

        let genres = &studies[0];
        assert_eq!(genres.category, "genres");
        assert_eq!(genres.rows_sampled, 4);
        assert_eq!(genres.top[0].label, "Adventure");
        assert_eq!(genres.top[0].count, 3);

        // The zero-budget film has a NaN rate and sorts last.
        let by_rate = studies
            .iter()
            .find(|s| s.rank_by == "profits_rate" && s.category == "release_month")
            .unwrap();
        assert_eq!(by_rate.top[0].label, "6");
    }

    #[test]
    fn test_popularity_section() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("movies.csv"), MOVIES).unwrap();
        let config = config_for(dir.path());

        let movies = run_pipeline(&config);
        let loved = analysis::select_loved_movies(&movies, &config.popularity_options()).unwrap();
        let section = run_popularity(&loved, &config).unwrap();

        assert_eq!(section.movies, 3);
        let genres = section
            .results
            .iter()
            .find(|r| r.category == "genres")
            .unwrap();
        assert_eq!(genres.top[0].label, "Adventure");
        assert_eq!(genres.top[0].count, 3);
    }

    #[test]
    fn test_unknown_study_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("movies.csv"), MOVIES).unwrap();
        let mut config = config_for(dir.path());
        config.analysis.studies = vec![config::StudySpec::new("profits", 5, "keywords")];

        let movies = run_pipeline(&config);
        let err = run_studies(&movies, &config).unwrap_err();
        assert!(format!("{:#}", err).contains("keywords"));
    }

    #[test]
    fn test_run_analysis_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("movies.csv"), MOVIES).unwrap();
        let config = config_for(dir.path());
        let config_path = dir.path().join("moviestat.toml");
        std::fs::write(&config_path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let args = Args {
            input: None,
            output: None,
            format: OutputFormat::Markdown,
            charts_dir: None,
            no_charts: true,
            max_labels: Some(3),
            config: Some(config_path),
            verbose: false,
            quiet: true,
            init_config: false,
        };
        run_analysis(args).unwrap();

        let report = std::fs::read_to_string(dir.path().join("report.md")).unwrap();
        assert!(report.contains("# MovieStat Report"));
        assert!(report.contains("### genres: top 50 by profits"));
        assert!(report.contains("| Exact duplicate rows | 1 |"));
        assert!(report.contains("| Duplicate rows removed | 1 |"));
        assert!(!dir.path().join("charts").exists());
    }
}
