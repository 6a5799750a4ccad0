//! Video ID collection from an uploads playlist

use crate::retry::RetryPolicy;
use tracing::{debug, info, instrument};
use ytstats_common::{RequestedCount, Result, YouTubeApi, MAX_PAGE_SIZE};

/// Pages through a playlist collecting video IDs
#[derive(Debug)]
pub struct VideoIdCollector<'a, A: ?Sized> {
    api: &'a A,
    retry: RetryPolicy,
    page_size: u32,
}

impl<'a, A> VideoIdCollector<'a, A>
where
    A: YouTubeApi + ?Sized,
{
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            retry: RetryPolicy::default(),
            page_size: MAX_PAGE_SIZE,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Items requested per page, clamped to 1..=50
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Collect IDs in the playlist's own order.
    ///
    /// Stops when the requested count is reached, when no continuation token
    /// comes back, or when a page carries no items. Transient failures retry
    /// the same page with the same token; any error that survives the retry
    /// policy aborts the collection.
    #[instrument(skip(self), fields(requested = %mode))]
    pub async fn collect_video_ids(
        &self,
        playlist_id: &str,
        mode: RequestedCount,
    ) -> Result<Vec<String>> {
        let target = mode.limit();
        let mut ids: Vec<String> = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page_size = match target {
                Some(n) => {
                    let remaining = n.saturating_sub(ids.len());
                    u32::try_from(remaining).map_or(self.page_size, |r| r.min(self.page_size))
                }
                None => self.page_size,
            };

            let page = self
                .retry
                .run("playlist page", || {
                    self.api
                        .playlist_page(playlist_id, page_size, page_token.clone())
                })
                .await?;
            pages += 1;

            let items = match page.video_ids {
                Some(items) if !items.is_empty() => items,
                _ => {
                    debug!(page = pages, "Page carried no items, stopping");
                    break;
                }
            };
            debug!(page = pages, count = items.len(), "Collected page");
            ids.extend(items);

            if let Some(n) = target {
                if ids.len() >= n {
                    ids.truncate(n);
                    break;
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!(pages, total = ids.len(), "Collected video IDs");
        Ok(ids)
    }
}
