//! Batched statistics lookup for collected video IDs

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use ytstats_common::{Result, VideoRecord, YouTubeApi, MAX_BATCH_SIZE};

/// A statistics batch that failed with a non-transient error and was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedBatch {
    /// Zero-based batch index
    pub index: usize,
    /// Number of video IDs in the batch
    pub size: usize,
    pub first_video_id: String,
    pub message: String,
}

/// Records gathered from every batch that succeeded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsOutcome {
    /// In batch order, not chronological order
    pub records: Vec<VideoRecord>,
    pub failed_batches: Vec<FailedBatch>,
}

impl StatisticsOutcome {
    /// Whether every batch was fetched
    pub fn is_complete(&self) -> bool {
        self.failed_batches.is_empty()
    }

    /// Number of video IDs whose batch was skipped
    pub fn skipped_videos(&self) -> usize {
        self.failed_batches.iter().map(|b| b.size).sum()
    }
}

/// Fetches view statistics in batches of at most 50 IDs
#[derive(Debug)]
pub struct StatisticsFetcher<'a, A: ?Sized> {
    api: &'a A,
    retry: RetryPolicy,
    batch_size: usize,
}

impl<'a, A> StatisticsFetcher<'a, A>
where
    A: YouTubeApi + ?Sized,
{
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            retry: RetryPolicy::default(),
            batch_size: MAX_BATCH_SIZE,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// IDs per request, clamped to 1..=50
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    /// Fetch statistics for `video_ids`, one call per batch.
    ///
    /// A transient failure that outlives the retry policy aborts the whole
    /// fetch. Any other failure skips that batch: its records are dropped,
    /// the batches already fetched are kept, and the skip is reported in
    /// `StatisticsOutcome::failed_batches`.
    #[instrument(skip(self, video_ids), fields(videos = video_ids.len()))]
    pub async fn fetch_statistics(&self, video_ids: &[String]) -> Result<StatisticsOutcome> {
        let mut outcome = StatisticsOutcome {
            records: Vec::with_capacity(video_ids.len()),
            failed_batches: Vec::new(),
        };

        for (index, batch) in video_ids.chunks(self.batch_size).enumerate() {
            match self
                .retry
                .run("statistics batch", || self.api.videos(batch))
                .await
            {
                Ok(records) => {
                    debug!(batch = index, count = records.len(), "Fetched statistics");
                    outcome.records.extend(records);
                }
                Err(error) if error.is_transient() => return Err(error),
                Err(error) => {
                    warn!(
                        batch = index,
                        size = batch.len(),
                        "Skipping statistics batch: {}",
                        error
                    );
                    outcome.failed_batches.push(FailedBatch {
                        index,
                        size: batch.len(),
                        first_video_id: batch.first().cloned().unwrap_or_default(),
                        message: error.to_string(),
                    });
                }
            }
        }

        info!(
            records = outcome.records.len(),
            failed_batches = outcome.failed_batches.len(),
            "Fetched video statistics"
        );
        Ok(outcome)
    }
}
