//! Graph rendering trait and the SVG line chart

use crate::{
    series::SeriesPoint,
    types::{GraphConfig, MOVING_AVERAGE_SERIES, VIEW_COUNT_SERIES},
};
use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use plotters::{coord::Shift, prelude::*};
use std::path::Path;
use tracing::{info, instrument};
use ytstats_common::{ensure, Result};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Trait for renderers that draw a view-count series
#[async_trait]
pub trait GraphRenderer: Send + Sync {
    /// Render the chart into a file at `path`
    async fn render_to_file(
        &self,
        config: &GraphConfig,
        series: &[SeriesPoint],
        path: &Path,
    ) -> Result<()>;

    /// Render the chart into an in-memory document
    async fn render_to_string(&self, config: &GraphConfig, series: &[SeriesPoint])
        -> Result<String>;

    /// Gets the name of this graph type.
    fn name(&self) -> &'static str;

    /// Gets the description of this graph type.
    fn description(&self) -> &'static str;
}

/// View count and moving average against upload date, as SVG
#[derive(Debug, Default, Clone, Copy)]
pub struct LineChartRenderer;

impl LineChartRenderer {
    pub fn new() -> Self {
        Self
    }

    fn draw<DB>(
        &self,
        root: &DrawingArea<DB, Shift>,
        config: &GraphConfig,
        series: &[SeriesPoint],
    ) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: std::error::Error + Send + Sync + 'static,
    {
        ensure!(!series.is_empty(), graph, "No data to render");

        root.fill(&config.background())?;

        let (x_min, x_max) = x_range(series);
        let y_max = y_upper_bound(series);
        let view_color = config.view_count();
        let average_color = config.moving_average();

        let mut chart = ChartBuilder::on(root)
            .caption(
                &config.title,
                ("sans-serif", f64::from(config.title_font_size)),
            )
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

        let date_labels = |x: &f64| format_axis_date(*x);
        let count_labels = |y: &f64| format!("{y:.0}");
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(config.x_label.as_str())
            .y_desc(config.y_label.as_str())
            .x_labels(8)
            .x_label_formatter(&date_labels)
            .y_label_formatter(&count_labels)
            .label_style(("sans-serif", f64::from(config.label_font_size)));
        if !config.show_grid {
            mesh.disable_mesh();
        }
        mesh.draw()?;

        chart
            .draw_series(LineSeries::new(
                series.iter().map(|p| (x_of(&p.upload_date), p.view_count as f64)),
                view_color.stroke_width(2),
            ))?
            .label(VIEW_COUNT_SERIES)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], view_color));

        if config.show_points {
            chart.draw_series(series.iter().map(|p| {
                Circle::new(
                    (x_of(&p.upload_date), p.view_count as f64),
                    3,
                    view_color.filled(),
                )
            }))?;
        }

        // Points before the window fills are left out, not drawn as zero
        let averages: Vec<(f64, f64)> = series
            .iter()
            .filter_map(|p| p.moving_average.map(|avg| (x_of(&p.upload_date), avg)))
            .collect();
        if !averages.is_empty() {
            chart
                .draw_series(LineSeries::new(averages, average_color.stroke_width(2)))?
                .label(MOVING_AVERAGE_SERIES)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], average_color)
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerMiddle)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}

#[async_trait]
impl GraphRenderer for LineChartRenderer {
    #[instrument(skip(self, config, series), fields(points = series.len()))]
    async fn render_to_file(
        &self,
        config: &GraphConfig,
        series: &[SeriesPoint],
        path: &Path,
    ) -> Result<()> {
        let root = SVGBackend::new(path, (config.width, config.height)).into_drawing_area();
        self.draw(&root, config, series)?;
        info!("Rendered view count chart to {}", path.display());
        Ok(())
    }

    async fn render_to_string(
        &self,
        config: &GraphConfig,
        series: &[SeriesPoint],
    ) -> Result<String> {
        let mut svg = String::new();
        {
            let root =
                SVGBackend::with_string(&mut svg, (config.width, config.height)).into_drawing_area();
            self.draw(&root, config, series)?;
        }
        Ok(svg)
    }

    fn name(&self) -> &'static str {
        "view_count_line"
    }

    fn description(&self) -> &'static str {
        "View count and moving average by upload date"
    }
}

fn x_of(date: &NaiveDateTime) -> f64 {
    Utc.from_utc_datetime(date).timestamp() as f64
}

/// Horizontal extent with 5% padding; a single upload gets a day either side
fn x_range(series: &[SeriesPoint]) -> (f64, f64) {
    let xs = series.iter().map(|p| x_of(&p.upload_date));
    let min = xs.clone().fold(f64::INFINITY, f64::min);
    let max = xs.fold(f64::NEG_INFINITY, f64::max);

    if (max - min).abs() < f64::EPSILON {
        return (min - SECONDS_PER_DAY, max + SECONDS_PER_DAY);
    }
    let padding = (max - min) * 0.05;
    (min - padding, max + padding)
}

fn y_upper_bound(series: &[SeriesPoint]) -> f64 {
    let max = series
        .iter()
        .flat_map(|p| std::iter::once(p.view_count as f64).chain(p.moving_average))
        .fold(0.0, f64::max);
    (max * 1.1).max(1.0)
}

fn format_axis_date(x: f64) -> String {
    Utc.timestamp_opt(x.round() as i64, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
