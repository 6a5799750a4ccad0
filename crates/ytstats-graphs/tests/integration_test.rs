//! Integration tests for ytstats-graphs crate.
//!
//! These build a series from scripted records and push it through both
//! presentation paths.

use calamine::{open_workbook, Reader, Xlsx};
use chrono::NaiveDate;
use ytstats_common::{
    test_utils::{fixtures, init_test_logging},
    RequestedCount,
};
use ytstats_config::ChartSettings;
use ytstats_graphs::{
    build_series, GraphConfig, GraphRenderer, LineChartRenderer, SpreadsheetExporter, SHEET_NAME,
};

#[tokio::test]
async fn test_series_to_chart_and_workbook() {
    init_test_logging();

    // Statistics arrive in batch order, newest first
    let mut records = fixtures::daily_videos(40);
    records.reverse();
    let series = build_series(&records).unwrap();
    assert_eq!(series[0].video_id, "v0");
    assert_eq!(series[39].video_id, "v39");

    let dir = tempfile::tempdir().unwrap();
    let chart_path = dir.path().join("chart.svg");
    let config = GraphConfig::from(&ChartSettings::default()).for_channel("Integration");
    LineChartRenderer::new()
        .render_to_file(&config, &series, &chart_path)
        .await
        .unwrap();
    assert!(std::fs::read_to_string(&chart_path)
        .unwrap()
        .contains("View Counts for Integration"));

    let workbook_path = SpreadsheetExporter::new(dir.path())
        .export(
            "Integration",
            RequestedCount::All,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            &series,
        )
        .unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&workbook_path).unwrap();
    assert_eq!(workbook.sheet_names().to_vec(), vec![SHEET_NAME.to_string()]);
    let range = workbook.worksheet_range(SHEET_NAME).unwrap().unwrap();
    assert_eq!(range.height(), 41);
}

#[tokio::test]
async fn test_renderer_as_trait_object() {
    let renderers: Vec<Box<dyn GraphRenderer>> = vec![Box::new(LineChartRenderer::new())];
    let series = build_series(&fixtures::daily_videos(5)).unwrap();

    for renderer in renderers {
        let svg = renderer
            .render_to_string(&GraphConfig::default(), &series)
            .await
            .unwrap();
        assert!(svg.contains("</svg>"), "{} produced no document", renderer.name());
    }
}
