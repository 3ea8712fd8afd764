//! Markdown and JSON report generation.
//!
//! This module renders a [`Report`] as a Markdown document with one table
//! per study, or as pretty-printed JSON.

use crate::analysis::{CorrelationMatrix, LabelCount, YearPoint};
use crate::models::{
    ChartFile, DatasetOverview, PopularitySection, Question, Report, ReportMetadata, StudyResult,
};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# MovieStat Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(report));
    output.push_str(&generate_overview_section(&report.overview));
    output.push_str(&generate_studies_section(&report.studies));
    output.push_str(&generate_popularity_section(&report.popularity));

    if let Some(ref matrix) = report.correlation {
        output.push_str(&generate_correlation_section(matrix));
    }

    output.push_str(&generate_yearly_section(&report.yearly_profits));
    output.push_str(&generate_charts_section(&report.charts));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Input:** `{}`\n", metadata.input));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &Report) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Dataset](#dataset)\n");
    toc.push_str("- [Commercial Success](#commercial-success)\n");

    for study in &report.studies {
        toc.push_str(&format!("  - [{}](#{})\n", study.title(), anchor(&study.title())));
    }

    toc.push_str("- [Popularity](#popularity)\n");
    if report.correlation.is_some() {
        toc.push_str("- [Correlation](#correlation)\n");
    }
    toc.push_str("- [Profit by Year](#profit-by-year)\n");
    if !report.charts.is_empty() {
        toc.push_str("- [Charts](#charts)\n");
    }
    toc.push('\n');

    toc
}

/// Generate the dataset overview section.
fn generate_overview_section(overview: &DatasetOverview) -> String {
    let mut section = String::new();

    section.push_str("## Dataset\n\n");
    section.push_str("| Step | Value |\n");
    section.push_str("|:---|---:|\n");
    section.push_str(&format!("| Rows loaded | {} |\n", overview.rows_loaded));
    section.push_str(&format!("| Columns loaded | {} |\n", overview.columns_loaded));
    section.push_str(&format!("| Missing cells | {} |\n", overview.missing_cells));
    section.push_str(&format!(
        "| Exact duplicate rows | {} |\n",
        overview.exact_duplicates
    ));
    section.push_str(&format!(
        "| Duplicate rows removed | {} |\n",
        overview.duplicates_removed
    ));
    section.push_str(&format!("| Cells filled | {} |\n", overview.cells_filled));
    section.push_str(&format!("| Rows analyzed | {} |\n", overview.rows_analyzed));
    section.push('\n');

    if !overview.dropped_columns.is_empty() {
        section.push_str(&format!(
            "Dropped columns: {}\n\n",
            overview
                .dropped_columns
                .iter()
                .map(|c| format!("`{}`", c))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    if overview.non_finite_profit_rates > 0 {
        section.push_str(&format!(
            "> ⚠️ {} movies have a zero adjusted budget; their profit rate is infinite \
             or undefined and ranks first (inf) or last (NaN) in profit rate studies.\n\n",
            overview.non_finite_profit_rates
        ));
    }

    if !overview.columns.is_empty() {
        section.push_str("<details>\n<summary>Columns</summary>\n\n");
        section.push_str("| Column | Type |\n");
        section.push_str("|:---|:---|\n");
        for (name, ty) in &overview.columns {
            section.push_str(&format!("| `{}` | {} |\n", name, ty));
        }
        section.push_str("\n</details>\n\n");
    }

    section
}

/// Generate the commercial success section.
fn generate_studies_section(studies: &[StudyResult]) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", Question::CommercialSuccess));

    if studies.is_empty() {
        section.push_str("No studies configured.\n\n");
        return section;
    }

    for study in studies {
        section.push_str(&format!("### {}\n\n", study.title()));
        section.push_str(&format!(
            "*Rows sampled: {} | Labels: {} | Distinct: {}*\n\n",
            study.rows_sampled, study.total_labels, study.distinct_labels
        ));
        section.push_str(&generate_label_table(&study.category, &study.top));
    }

    section
}

/// Generate the popularity section.
fn generate_popularity_section(popularity: &PopularitySection) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", Question::Popularity));
    section.push_str(&format!(
        "Top {} movies by average vote among those with at least {} votes, \
         excluding unknown production companies: **{} movies**.\n\n",
        popularity.sample_size, popularity.min_votes, popularity.movies
    ));

    for result in &popularity.results {
        section.push_str(&format!("### {}\n\n", result.category));
        section.push_str(&generate_label_table(&result.category, &result.top));
    }

    section
}

/// Generate a label/count table.
fn generate_label_table(category: &str, labels: &[LabelCount]) -> String {
    if labels.is_empty() {
        return "No labels.\n\n".to_string();
    }

    let mut table = String::new();
    table.push_str(&format!("| {} | Count |\n", category));
    table.push_str("|:---|:---:|\n");
    for entry in labels {
        let label = if entry.label.is_empty() {
            "*(empty)*".to_string()
        } else {
            entry.label.replace('|', "\\|")
        };
        table.push_str(&format!("| {} | {} |\n", label, entry.count));
    }
    table.push('\n');

    table
}

/// Generate the correlation matrix section.
fn generate_correlation_section(matrix: &CorrelationMatrix) -> String {
    let mut section = String::new();

    section.push_str("## Correlation\n\n");

    if matrix.columns.is_empty() {
        section.push_str("No numeric columns.\n\n");
        return section;
    }

    section.push_str("| |");
    for name in &matrix.columns {
        section.push_str(&format!(" {} |", name));
    }
    section.push('\n');
    section.push_str("|:---|");
    section.push_str(&"---:|".repeat(matrix.columns.len()));
    section.push('\n');

    for (name, row) in matrix.columns.iter().zip(&matrix.values) {
        section.push_str(&format!("| **{}** |", name));
        for value in row {
            match value {
                Some(v) => section.push_str(&format!(" {:.3} |", v)),
                None => section.push_str(" – |"),
            }
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

/// Generate the yearly profit section.
fn generate_yearly_section(points: &[YearPoint]) -> String {
    let mut section = String::new();

    section.push_str("## Profit by Year\n\n");

    if points.is_empty() {
        section.push_str("No yearly data available.\n\n");
        return section;
    }

    section.push_str("| Year | Movies | Mean Profit |\n");
    section.push_str("|:---:|:---:|---:|\n");
    for point in points {
        section.push_str(&format!(
            "| {} | {} | {:.0} |\n",
            point.year, point.movies, point.mean
        ));
    }
    section.push('\n');

    section
}

/// Generate the charts section.
fn generate_charts_section(charts: &[ChartFile]) -> String {
    if charts.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Charts\n\n");
    for chart in charts {
        section.push_str(&format!(
            "- [{}]({}) ({} points)\n",
            chart.title, chart.path, chart.points
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by MovieStat v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Markdown heading anchor for a title.
fn anchor(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file, creating parent directories.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PopularityResult;
    use crate::table::ColumnType;
    use chrono::Utc;

    fn label(label: &str, count: usize) -> LabelCount {
        LabelCount {
            label: label.to_string(),
            count,
        }
    }

    fn create_test_report() -> Report {
        Report {
            metadata: ReportMetadata {
                input: "tmdb-movies.csv".to_string(),
                analysis_date: Utc::now(),
                duration_seconds: 1.5,
            },
            overview: DatasetOverview {
                rows_loaded: 10866,
                columns_loaded: 21,
                missing_cells: 13434,
                exact_duplicates: 1,
                dropped_columns: vec!["id".to_string(), "overview".to_string()],
                duplicates_removed: 1,
                cells_filled: 13434,
                rows_analyzed: 10865,
                columns: vec![("genres".to_string(), ColumnType::List)],
                non_finite_profit_rates: 5696,
            },
            studies: vec![StudyResult {
                rank_by: "profits".to_string(),
                top_n: 50,
                category: "genres".to_string(),
                rows_sampled: 50,
                distinct_labels: 12,
                total_labels: 140,
                top: vec![label("Adventure", 35), label("Action", 28)],
            }],
            popularity: PopularitySection {
                min_votes: 1000.0,
                sample_size: 1000,
                movies: 420,
                results: vec![PopularityResult {
                    category: "production_companies".to_string(),
                    distinct_labels: 300,
                    total_labels: 1200,
                    top: vec![label("Warner Bros.", 60), label("", 1)],
                }],
            },
            correlation: Some(CorrelationMatrix {
                columns: vec!["popularity".to_string(), "profits".to_string()],
                values: vec![vec![Some(1.0), Some(0.55)], vec![Some(0.55), None]],
            }),
            yearly_profits: vec![YearPoint {
                year: 1977,
                mean: 123456.7,
                movies: 57,
            }],
            charts: vec![ChartFile {
                title: "Profit Evolution by Year".to_string(),
                path: "charts/profit_evolution_by_year.svg".to_string(),
                points: 1,
            }],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# MovieStat Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("| Exact duplicate rows | 1 |"));
        assert!(markdown.contains("## Commercial Success"));
        assert!(markdown.contains("### genres: top 50 by profits"));
        assert!(markdown.contains("| Adventure | 35 |"));
        assert!(markdown.contains("## Popularity"));
        assert!(markdown.contains("| Warner Bros. | 60 |"));
        assert!(markdown.contains("| *(empty)* | 1 |"));
        assert!(markdown.contains("## Correlation"));
        assert!(markdown.contains(" 0.550 |"));
        assert!(markdown.contains("| 1977 | 57 | 123457 |"));
        assert!(markdown.contains("charts/profit_evolution_by_year.svg"));
        assert!(markdown.contains("5696 movies have a zero adjusted budget"));
    }

    #[test]
    fn test_toc_links_studies() {
        let report = create_test_report();
        let toc = generate_table_of_contents(&report);
        assert!(toc.contains("[genres: top 50 by profits](#genres-top-50-by-profits)"));
        assert!(toc.contains("[Charts](#charts)"));
    }

    #[test]
    fn test_no_correlation_section_when_disabled() {
        let mut report = create_test_report();
        report.correlation = None;
        let markdown = generate_markdown_report(&report);
        assert!(!markdown.contains("## Correlation"));
    }

    #[test]
    fn test_label_table_escapes_delimiter() {
        let table = generate_label_table("cast", &[label("A|B", 2)]);
        assert!(table.contains("| A\\|B | 2 |"));
        assert_eq!(generate_label_table("cast", &[]), "No labels.\n\n");
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"studies\""));
        assert!(json.contains("\"rank_by\": \"profits\""));
        assert!(json.contains("\"yearly_profits\""));
        assert!(json.contains("\"list\""));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        write_report("# hello\n", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# hello\n");
    }

    #[test]
    fn test_write_report_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("nested").join("report.json");
        write_report("{}", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
