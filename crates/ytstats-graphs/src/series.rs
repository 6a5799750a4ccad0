//! Chronological view-count series with a trailing moving average

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ytstats_common::{Result, VideoRecord, YtStatsError};

/// One video on the series, in upload order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub video_id: String,
    pub title: String,
    /// Upload instant in UTC with the offset stripped
    pub upload_date: NaiveDateTime,
    pub view_count: u64,
    /// `None` until the moving-average window has filled
    pub moving_average: Option<f64>,
}

impl SeriesPoint {
    /// Turn the point back into the record it was built from
    pub fn to_record(&self) -> VideoRecord {
        VideoRecord {
            video_id: self.video_id.clone(),
            title: self.title.clone(),
            view_count: self.view_count,
            published_at: Utc
                .from_utc_datetime(&self.upload_date)
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

/// Aggregate figures for a built series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub videos: usize,
    pub total_views: u64,
    pub mean_views: f64,
    pub most_viewed_title: String,
    pub most_viewed_count: u64,
    pub first_upload: NaiveDateTime,
    pub last_upload: NaiveDateTime,
    pub window: usize,
}

/// Window size for `count` points: a tenth of the series, at least one
pub fn moving_average_window(count: usize) -> usize {
    (count / 10).max(1)
}

/// Parse an RFC 3339 upload timestamp into a naive UTC instant
pub fn parse_upload_date(published_at: &str) -> Result<NaiveDateTime> {
    DateTime::parse_from_rfc3339(published_at.trim())
        .map(|dt| dt.naive_utc())
        .map_err(|e| {
            YtStatsError::validation_field(
                format!("Unparseable upload date '{published_at}': {e}"),
                "published_at",
            )
        })
}

/// Build the chronological series for `records`.
///
/// Records are stable-sorted by upload date, so videos uploaded at the same
/// instant keep their input order. The average at index `i` covers the view
/// counts of `i + 1 - window ..= i`.
pub fn build_series(records: &[VideoRecord]) -> Result<Vec<SeriesPoint>> {
    let mut points = records
        .iter()
        .map(|record| {
            Ok(SeriesPoint {
                video_id: record.video_id.clone(),
                title: record.title.clone(),
                upload_date: parse_upload_date(&record.published_at)?,
                view_count: record.view_count,
                moving_average: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    points.sort_by_key(|point| point.upload_date);
    apply_moving_average(&mut points);

    tracing::debug!(
        points = points.len(),
        window = moving_average_window(points.len()),
        "Built view count series"
    );
    Ok(points)
}

fn apply_moving_average(points: &mut [SeriesPoint]) {
    let window = moving_average_window(points.len());
    let mut sum: u128 = 0;

    for i in 0..points.len() {
        sum += u128::from(points[i].view_count);
        if i >= window {
            sum -= u128::from(points[i - window].view_count);
        }
        points[i].moving_average = if i + 1 >= window {
            Some(sum as f64 / window as f64)
        } else {
            None
        };
    }
}

/// Summary figures, or `None` for an empty series
pub fn summarize(points: &[SeriesPoint]) -> Option<SeriesSummary> {
    let first = points.first()?;
    let last = points.last()?;
    let most_viewed = points.iter().max_by_key(|p| p.view_count)?;
    let total_views: u64 = points.iter().map(|p| p.view_count).sum();

    Some(SeriesSummary {
        videos: points.len(),
        total_views,
        mean_views: total_views as f64 / points.len() as f64,
        most_viewed_title: most_viewed.title.clone(),
        most_viewed_count: most_viewed.view_count,
        first_upload: first.upload_date,
        last_upload: last.upload_date,
        window: moving_average_window(points.len()),
    })
}
