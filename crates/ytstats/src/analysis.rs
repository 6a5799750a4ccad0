//! One full analysis: resolve, collect IDs, fetch statistics, build the series

use crate::coordinator::AnalysisEvent;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use ytstats_common::{
    now, ChannelIdentity, RequestedCount, Result, Timestamp, VideoRecord, YouTubeApi,
    MAX_BATCH_SIZE, MAX_PAGE_SIZE,
};
use ytstats_config::FetchSettings;
use ytstats_fetch::{resolve, FailedBatch, RetryPolicy, StatisticsFetcher, VideoIdCollector};
use ytstats_graphs::{build_series, summarize, SeriesPoint, SeriesSummary};

/// What to analyse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub url: String,
    pub requested: RequestedCount,
}

impl AnalysisRequest {
    pub fn new(url: impl Into<String>, requested: RequestedCount) -> Self {
        Self {
            url: url.into(),
            requested,
        }
    }
}

/// Everything one analysis produced
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub channel: ChannelIdentity,
    pub requested: RequestedCount,
    pub video_ids_collected: usize,
    /// Records in batch order
    pub records: Vec<VideoRecord>,
    /// Records in upload order with the moving average
    pub series: Vec<SeriesPoint>,
    pub failed_batches: Vec<FailedBatch>,
    pub completed_at: Timestamp,
}

impl AnalysisReport {
    pub fn is_complete(&self) -> bool {
        self.failed_batches.is_empty()
    }

    pub fn skipped_videos(&self) -> usize {
        self.failed_batches.iter().map(|b| b.size).sum()
    }

    pub fn summary(&self) -> Option<SeriesSummary> {
        summarize(&self.series)
    }
}

/// Sends progress lines to whoever started the analysis
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    events: Option<mpsc::Sender<AnalysisEvent>>,
}

impl ProgressReporter {
    pub fn new(events: mpsc::Sender<AnalysisEvent>) -> Self {
        Self {
            events: Some(events),
        }
    }

    /// A reporter that only logs
    pub fn silent() -> Self {
        Self::default()
    }

    pub async fn report(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        if let Some(events) = &self.events {
            // The receiver going away only means nobody is listening any more
            let _ = events.send(AnalysisEvent::Progress(message)).await;
        }
    }
}

/// Runs the analysis pipeline against a YouTube API
#[derive(Clone)]
pub struct Analyzer {
    api: Arc<dyn YouTubeApi>,
    retry: RetryPolicy,
    page_size: u32,
    batch_size: usize,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("api", &"<dyn YouTubeApi>")
            .field("retry", &self.retry)
            .field("page_size", &self.page_size)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Analyzer {
    pub fn new(api: Arc<dyn YouTubeApi>) -> Self {
        Self {
            api,
            retry: RetryPolicy::default(),
            page_size: MAX_PAGE_SIZE,
            batch_size: MAX_BATCH_SIZE,
        }
    }

    pub fn from_settings(api: Arc<dyn YouTubeApi>, settings: &FetchSettings) -> Self {
        Self {
            api,
            retry: RetryPolicy::from(settings),
            page_size: settings.page_size,
            batch_size: settings.batch_size,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run one analysis, reporting each stage through `progress`
    #[instrument(skip(self, progress), fields(url = %request.url, requested = %request.requested))]
    pub async fn run(
        &self,
        request: &AnalysisRequest,
        progress: &ProgressReporter,
    ) -> Result<AnalysisReport> {
        let api = self.api.as_ref();

        progress
            .report(format!("Processing channel: {}", request.url))
            .await;
        let channel = resolve(api, &request.url).await?;
        progress
            .report(format!("Extracted Channel ID: {}", channel.channel_id))
            .await;
        progress
            .report(format!("Channel Title: {}", channel.title))
            .await;

        match request.requested {
            RequestedCount::All => progress.report("Fetching all video IDs...").await,
            RequestedCount::Last(n) => {
                progress
                    .report(format!("Fetching the last {n} video IDs..."))
                    .await;
            }
        }
        let video_ids = VideoIdCollector::new(api)
            .with_retry_policy(self.retry)
            .with_page_size(self.page_size)
            .collect_video_ids(&channel.uploads_playlist_id, request.requested)
            .await?;
        progress
            .report(format!("Total Videos Retrieved: {}", video_ids.len()))
            .await;

        progress.report("Fetching video statistics...").await;
        let outcome = StatisticsFetcher::new(api)
            .with_retry_policy(self.retry)
            .with_batch_size(self.batch_size)
            .fetch_statistics(&video_ids)
            .await?;
        if !outcome.is_complete() {
            warn!(
                batches = outcome.failed_batches.len(),
                videos = outcome.skipped_videos(),
                "Statistics incomplete"
            );
            progress
                .report(format!(
                    "Skipped {} statistics batch(es) covering {} videos",
                    outcome.failed_batches.len(),
                    outcome.skipped_videos()
                ))
                .await;
        }
        progress.report("Video statistics retrieved.").await;

        let series = build_series(&outcome.records)?;

        Ok(AnalysisReport {
            channel,
            requested: request.requested,
            video_ids_collected: video_ids.len(),
            records: outcome.records,
            series,
            failed_batches: outcome.failed_batches,
            completed_at: now(),
        })
    }
}
