//! SVG chart rendering with plotters.

use anyhow::{Context, Result};
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analysis::YearPoint;
use crate::error::TableError;
use crate::models::ChartFile;
use crate::table::schema::col;
use crate::table::MovieTable;

/// Writes scatter and line charts as SVG files into one directory.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    directory: PathBuf,
    size: (u32, u32),
}

impl ChartRenderer {
    pub fn new(directory: impl Into<PathBuf>, size: (u32, u32)) -> Self {
        Self {
            directory: directory.into(),
            size,
        }
    }

    /// Scatter plot of `x` against `y`. Pairs with a missing or non-finite
    /// side are skipped.
    pub fn scatter(
        &self,
        title: &str,
        x: &[Option<f64>],
        y: &[Option<f64>],
        x_label: &str,
        y_label: &str,
    ) -> Result<ChartFile> {
        if x.len() != y.len() {
            return Err(TableError::InvalidArgument(format!(
                "scatter '{}' needs equal lengths, got {} and {}",
                title,
                x.len(),
                y.len()
            ))
            .into());
        }

        let points: Vec<(f64, f64)> = x
            .iter()
            .zip(y)
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .filter(|(a, b)| a.is_finite() && b.is_finite())
            .collect();

        let path = self.chart_path(title)?;
        {
            let root = SVGBackend::new(&path, self.size).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 24))
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(80)
                .build_cartesian_2d(
                    axis_range(points.iter().map(|p| p.0)),
                    axis_range(points.iter().map(|p| p.1)),
                )?;
            chart
                .configure_mesh()
                .x_desc(x_label)
                .y_desc(y_label)
                .draw()?;

            chart.draw_series(
                points
                    .iter()
                    .map(|&(a, b)| Circle::new((a, b), 3, BLUE.mix(0.5).filled())),
            )?;
            root.present()?;
        }

        debug!("Scatter '{}' drew {} points", title, points.len());
        Ok(self.chart_file(title, &path, points.len()))
    }

    /// Line chart through `points`, in the given order.
    pub fn line(
        &self,
        title: &str,
        points: &[(f64, f64)],
        x_label: &str,
        y_label: &str,
    ) -> Result<ChartFile> {
        let points: Vec<(f64, f64)> = points
            .iter()
            .copied()
            .filter(|(a, b)| a.is_finite() && b.is_finite())
            .collect();

        let path = self.chart_path(title)?;
        {
            let root = SVGBackend::new(&path, self.size).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 24))
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(100)
                .build_cartesian_2d(
                    axis_range(points.iter().map(|p| p.0)),
                    axis_range(points.iter().map(|p| p.1)),
                )?;
            chart
                .configure_mesh()
                .x_desc(x_label)
                .y_desc(y_label)
                .draw()?;

            chart.draw_series(LineSeries::new(points.iter().copied(), &RED))?;
            root.present()?;
        }

        debug!("Line '{}' drew {} points", title, points.len());
        Ok(self.chart_file(title, &path, points.len()))
    }

    fn chart_path(&self, title: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.directory).with_context(|| {
            format!(
                "Failed to create charts directory: {}",
                self.directory.display()
            )
        })?;
        Ok(self.directory.join(format!("{}.svg", slug(title))))
    }

    fn chart_file(&self, title: &str, path: &Path, points: usize) -> ChartFile {
        ChartFile {
            title: title.to_string(),
            path: path.display().to_string(),
            points,
        }
    }
}

/// Render the standard set of charts: rating/popularity/profit scatter plots
/// over the loved movies and the yearly profit line.
pub fn render_report_charts(
    renderer: &ChartRenderer,
    loved: &MovieTable,
    yearly: &[YearPoint],
) -> Result<Vec<ChartFile>> {
    let scatters = [
        (
            "Correlation Between Average Vote and Popularity",
            col::VOTE_AVERAGE,
            col::POPULARITY,
            "Average Vote",
            "Popularity",
        ),
        (
            "Correlation Between Profits and Popularity",
            col::PROFITS,
            col::POPULARITY,
            "Profits",
            "Popularity",
        ),
        (
            "Correlation Between Profits Rate and Popularity",
            col::PROFITS_RATE,
            col::POPULARITY,
            "Profits Rate",
            "Popularity",
        ),
        (
            "Correlation Between Profits and Average Vote",
            col::VOTE_AVERAGE,
            col::PROFITS,
            "Average Vote",
            "Profits",
        ),
        (
            "Correlation Between Profits Rate and Average Vote",
            col::VOTE_AVERAGE,
            col::PROFITS_RATE,
            "Average Vote",
            "Profits Rate",
        ),
    ];

    let mut charts = Vec::new();
    for (title, x_col, y_col, x_label, y_label) in scatters {
        let x = loved.numeric_values(x_col, "chart")?;
        let y = loved.numeric_values(y_col, "chart")?;
        charts.push(renderer.scatter(title, &x, &y, x_label, y_label)?);
    }

    let points: Vec<(f64, f64)> = yearly.iter().map(|p| (p.year as f64, p.mean)).collect();
    charts.push(renderer.line("Profit Evolution by Year", &points, "Year", "Profit")?);

    info!("Rendered {} charts", charts.len());
    Ok(charts)
}

/// Axis range covering all values, widened when empty or degenerate.
fn axis_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if min == max {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

/// File-name friendly form of a title.
fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(
            slug("Correlation Between Profits Rate and Popularity"),
            "correlation_between_profits_rate_and_popularity"
        );
        assert_eq!(slug("  Profit / Year!  "), "profit_year");
    }

    #[test]
    fn test_axis_range() {
        assert_eq!(axis_range(std::iter::empty()), 0.0..1.0);
        assert_eq!(axis_range([2.0].into_iter()), 1.0..3.0);
        let r = axis_range([0.0, 10.0].into_iter());
        assert!(r.start < 0.0 && r.end > 10.0);
    }

    #[test]
    fn test_scatter_writes_svg_and_skips_non_finite() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path().join("charts"), (400, 300));

        let x = [Some(1.0), Some(2.0), Some(f64::INFINITY), None];
        let y = [Some(3.0), Some(4.0), Some(5.0), Some(6.0)];
        let chart = renderer
            .scatter("Vote vs Popularity", &x, &y, "Vote", "Popularity")
            .unwrap();

        assert_eq!(chart.points, 2);
        let content = std::fs::read_to_string(&chart.path).unwrap();
        assert!(content.contains("<svg"));
        assert!(chart.path.ends_with("vote_vs_popularity.svg"));
    }

    #[test]
    fn test_scatter_rejects_unequal_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path(), (400, 300));
        let err = renderer
            .scatter("Bad", &[Some(1.0)], &[], "x", "y")
            .unwrap_err();
        assert!(err.to_string().contains("equal lengths"));
    }

    #[test]
    fn test_line_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path(), (400, 300));
        let chart = renderer
            .line("Profit by Year", &[(1990.0, 5.0), (2000.0, 20.0)], "Year", "Profit")
            .unwrap();
        assert_eq!(chart.points, 2);
        assert!(std::path::Path::new(&chart.path).exists());
    }
}
