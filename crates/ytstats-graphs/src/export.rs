//! Spreadsheet export with an embedded line chart

use crate::{
    series::SeriesPoint,
    types::{chart_title, MOVING_AVERAGE_SERIES, VIEW_COUNT_SERIES, X_AXIS_LABEL, Y_AXIS_LABEL},
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Chart, ChartType, Format, Workbook};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use ytstats_common::{ensure, sanitize_filename, RequestedCount, Result, YtStatsError};
use ytstats_config::ExportSettings;

pub const SHEET_NAME: &str = "Video Statistics";
pub const HEADERS: [&str; 5] = ["Video ID", "Title", "View Count", "Upload Date", "Moving Average"];

const VIEW_COUNT_COLUMN: u16 = 2;
const UPLOAD_DATE_COLUMN: u16 = 3;
const MOVING_AVERAGE_COLUMN: u16 = 4;
const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
/// Chart anchor: F2, next to the last data column
const CHART_ROW: u32 = 1;
const CHART_COLUMN: u16 = 5;

/// `{title}-{requested}-{YYYYMMDD}.xlsx` with the title's forbidden characters removed
pub fn export_filename(channel_title: &str, requested: RequestedCount, date: NaiveDate) -> String {
    format!(
        "{}-{}-{}.xlsx",
        sanitize_filename(channel_title),
        requested,
        date.format("%Y%m%d")
    )
}

/// Excel serial date: days since 1899-12-30, fraction for the time of day
pub fn excel_serial(date: &NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    (*date - epoch).num_seconds() as f64 / 86_400.0
}

/// Writes series to `.xlsx` workbooks
#[derive(Debug, Clone)]
pub struct SpreadsheetExporter {
    directory: PathBuf,
    chart_width: u32,
    chart_height: u32,
}

impl Default for SpreadsheetExporter {
    fn default() -> Self {
        Self::from(&ExportSettings::default())
    }
}

impl From<&ExportSettings> for SpreadsheetExporter {
    fn from(settings: &ExportSettings) -> Self {
        Self {
            directory: PathBuf::from(&settings.directory),
            chart_width: settings.chart_width,
            chart_height: settings.chart_height,
        }
    }
}

impl SpreadsheetExporter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Export into the configured directory under the standard filename.
    ///
    /// Returns the path of the written workbook.
    #[instrument(skip(self, series), fields(points = series.len()))]
    pub fn export(
        &self,
        channel_title: &str,
        requested: RequestedCount,
        date: NaiveDate,
        series: &[SeriesPoint],
    ) -> Result<PathBuf> {
        let path = self
            .directory
            .join(export_filename(channel_title, requested, date));
        self.write_workbook(&path, channel_title, series)?;
        Ok(path)
    }

    /// Write one workbook to `path`
    pub fn write_workbook(
        &self,
        path: &Path,
        channel_title: &str,
        series: &[SeriesPoint],
    ) -> Result<()> {
        ensure!(!series.is_empty(), export, "No data to export");

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                YtStatsError::export_with_source(
                    format!("Cannot create export directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        let header = Format::new().set_bold();
        let date_format = Format::new().set_num_format(DATE_FORMAT);

        for (col, title) in (0u16..).zip(HEADERS) {
            worksheet.write_string_with_format(0, col, title, &header)?;
        }

        for (row, point) in (1u32..).zip(series) {
            worksheet.write_string(row, 0, &point.video_id)?;
            worksheet.write_string(row, 1, &point.title)?;
            worksheet.write_number(row, VIEW_COUNT_COLUMN, point.view_count as f64)?;
            worksheet.write_number_with_format(
                row,
                UPLOAD_DATE_COLUMN,
                excel_serial(&point.upload_date),
                &date_format,
            )?;
            if let Some(average) = point.moving_average {
                worksheet.write_number(row, MOVING_AVERAGE_COLUMN, average)?;
            }
        }

        worksheet.set_column_width(0, 14)?;
        worksheet.set_column_width(1, 48)?;
        worksheet.set_column_width(UPLOAD_DATE_COLUMN, 20)?;
        worksheet.set_column_width(MOVING_AVERAGE_COLUMN, 16)?;

        let last_row = u32::try_from(series.len())
            .map_err(|_| YtStatsError::export("Too many rows for one worksheet"))?;
        let chart = self.build_chart(channel_title, last_row);
        worksheet.insert_chart(CHART_ROW, CHART_COLUMN, &chart)?;

        workbook.save(path)?;
        info!("Exported {} rows to {}", series.len(), path.display());
        Ok(())
    }

    fn build_chart(&self, channel_title: &str, last_row: u32) -> Chart {
        let mut chart = Chart::new(ChartType::Line);
        chart.title().set_name(chart_title(channel_title).as_str());
        chart.set_style(10);
        chart.set_width(self.chart_width);
        chart.set_height(self.chart_height);
        chart.x_axis().set_name(X_AXIS_LABEL);
        chart.y_axis().set_name(Y_AXIS_LABEL);

        for (name, column) in [
            (VIEW_COUNT_SERIES, VIEW_COUNT_COLUMN),
            (MOVING_AVERAGE_SERIES, MOVING_AVERAGE_COLUMN),
        ] {
            chart
                .add_series()
                .set_name(name)
                .set_categories((SHEET_NAME, 1, UPLOAD_DATE_COLUMN, last_row, UPLOAD_DATE_COLUMN))
                .set_values((SHEET_NAME, 1, column, last_row, column));
        }
        chart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{build_series, parse_upload_date};
    use calamine::{open_workbook, DataType, Reader, Xlsx};
    use ytstats_common::test_utils::{assert_approx_eq, fixtures};

    fn number(cell: Option<&DataType>) -> Option<f64> {
        match cell? {
            DataType::Float(f) | DataType::DateTime(f) => Some(*f),
            DataType::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(
            export_filename("Tech: Talk?", RequestedCount::All, date),
            "Tech Talk-All-20240506.xlsx"
        );
        assert_eq!(
            export_filename("a/b|c", RequestedCount::last(100).unwrap(), date),
            "abc-100-20240506.xlsx"
        );
    }

    #[test]
    fn test_excel_serial() {
        let date = parse_upload_date("2024-01-01T12:00:00Z").unwrap();
        assert_approx_eq(excel_serial(&date), 45292.5, 1e-9);
        let epoch = parse_upload_date("1900-01-01T00:00:00Z").unwrap();
        assert_approx_eq(excel_serial(&epoch), 2.0, 1e-9);
    }

    #[test]
    fn test_workbook_contents() {
        let dir = tempfile::tempdir().unwrap();
        // 25 points give a window of 2, so the first average is blank
        let series = build_series(&fixtures::daily_videos(25)).unwrap();
        let exporter = SpreadsheetExporter::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let path = exporter
            .export("Test Channel", RequestedCount::All, date, &series)
            .unwrap();
        assert_eq!(path, dir.path().join("Test Channel-All-20240201.xlsx"));

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap().unwrap();

        assert_eq!(range.get_size(), (26, 5));
        for (col, title) in HEADERS.iter().enumerate() {
            assert_eq!(
                range.get_value((0, col as u32)).and_then(DataType::get_string),
                Some(*title)
            );
        }

        assert_eq!(
            range.get_value((1, 0)).and_then(DataType::get_string),
            Some("v0")
        );
        assert_eq!(number(range.get_value((1, 2))), Some(10.0));
        assert_approx_eq(number(range.get_value((1, 3))).unwrap(), 45292.5, 1e-6);
        assert!(number(range.get_value((1, 4))).is_none());
        assert_eq!(number(range.get_value((2, 4))), Some(15.0));
        assert_eq!(number(range.get_value((25, 2))), Some(250.0));
    }

    #[test]
    fn test_chart_anchored_beside_data() {
        // F2: first row below the header, first column after the data
        assert_eq!(CHART_ROW, 1);
        assert_eq!(usize::from(CHART_COLUMN), HEADERS.len());
        assert_eq!(CHART_COLUMN, MOVING_AVERAGE_COLUMN + 1);
    }

    #[test]
    fn test_export_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports").join("2024");
        let series = build_series(&fixtures::daily_videos(3)).unwrap();

        let path = SpreadsheetExporter::new(&nested)
            .export(
                "Nested",
                RequestedCount::last(50).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                &series,
            )
            .unwrap();
        assert!(path.exists());
        assert!(path.starts_with(&nested));
    }

    #[test]
    fn test_empty_series_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = SpreadsheetExporter::new(dir.path())
            .write_workbook(&dir.path().join("empty.xlsx"), "Empty", &[])
            .unwrap_err();
        assert!(matches!(err, YtStatsError::Export { .. }));
        assert!(!dir.path().join("empty.xlsx").exists());
    }

    #[test]
    fn test_exporter_from_settings() {
        let settings = ExportSettings {
            directory: "out".to_string(),
            ..ExportSettings::default()
        };
        let exporter = SpreadsheetExporter::from(&settings);
        assert_eq!(exporter.directory(), Path::new("out"));
        assert_eq!(exporter.chart_width, settings.chart_width);

        let moved = exporter.with_directory("elsewhere");
        assert_eq!(moved.directory(), Path::new("elsewhere"));
        assert_eq!(moved.chart_height, settings.chart_height);
    }
}
