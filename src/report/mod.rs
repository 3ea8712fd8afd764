//! Report rendering: Markdown/JSON documents and SVG charts.

pub mod chart;
pub mod generator;

pub use chart::{render_report_charts, ChartRenderer};
pub use generator::{generate_json_report, generate_markdown_report, write_report};
