//! # ytstats Graphs
//!
//! Chronological view-count series, chart rendering and spreadsheet export.
//!
//! The series builder is pure; the renderer draws SVG with plotters and the
//! exporter writes `.xlsx` workbooks with an embedded line chart.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod export;
pub mod renderer;
pub mod series;
pub mod types;

pub use export::{excel_serial, export_filename, SpreadsheetExporter, SHEET_NAME};
pub use renderer::{GraphRenderer, LineChartRenderer};
pub use series::{
    build_series, moving_average_window, parse_upload_date, summarize, SeriesPoint, SeriesSummary,
};
pub use types::{chart_title, parse_hex_color, GraphConfig};
