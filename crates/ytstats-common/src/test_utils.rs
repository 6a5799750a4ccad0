//! Test utilities and shared test helpers for ytstats.
//!
//! This module provides fixtures and a scripted in-memory YouTube API that
//! the other crates use in unit and integration tests.

use crate::{
    error::{Result, YtStatsError},
    types::{ChannelIdentity, PlaylistPage, VideoRecord},
    youtube::YouTubeApi,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, Once},
};
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Test fixture for creating a mock timestamp.
pub fn mock_timestamp(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .unwrap()
}

/// Create a temporary directory for tests that automatically cleans up.
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Video and channel fixtures.
pub mod fixtures {
    use super::*;

    /// A channel identity with predictable IDs derived from `channel_id`
    pub fn channel(channel_id: &str, title: &str) -> ChannelIdentity {
        ChannelIdentity {
            channel_id: channel_id.to_string(),
            uploads_playlist_id: uploads_playlist_for(channel_id),
            title: title.to_string(),
        }
    }

    /// Uploads playlist IDs replace the `UC` prefix with `UU`
    pub fn uploads_playlist_for(channel_id: &str) -> String {
        match channel_id.strip_prefix("UC") {
            Some(rest) => format!("UU{rest}"),
            None => format!("UU{channel_id}"),
        }
    }

    /// A single record
    pub fn video(video_id: &str, view_count: u64, published_at: &str) -> VideoRecord {
        VideoRecord {
            video_id: video_id.to_string(),
            title: format!("Video {video_id}"),
            view_count,
            published_at: published_at.to_string(),
        }
    }

    /// `count` records named `v0..`, one per day from 2024-01-01, with views `(i + 1) * 10`
    pub fn daily_videos(count: usize) -> Vec<VideoRecord> {
        let start = mock_timestamp(2024, 1, 1, 12, 0, 0);
        (0..count)
            .map(|i| {
                let published = start + Duration::days(i as i64);
                video(
                    &format!("v{i}"),
                    (i as u64 + 1) * 10,
                    &published.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                )
            })
            .collect()
    }
}

/// Kind of failure a scripted call produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Looks like a TLS/connection failure; eligible for retry
    Transport,
    /// Looks like an HTTP 500 from the API; never retried
    Remote,
}

impl Fault {
    fn into_error(self, context: &str) -> YtStatsError {
        match self {
            Self::Transport => {
                YtStatsError::transient(format!("scripted TLS handshake failure ({context})"))
            }
            Self::Remote => {
                YtStatsError::remote_api_with_status(format!("scripted backend error ({context})"), 500)
            }
        }
    }
}

/// One recorded `playlist_page` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCall {
    pub playlist_id: String,
    pub max_results: u32,
    pub page_token: Option<String>,
}

#[derive(Debug, Default)]
struct Script {
    channels: HashMap<String, ChannelIdentity>,
    usernames: HashMap<String, String>,
    searches: HashMap<String, String>,
    playlists: HashMap<String, Vec<String>>,
    videos: HashMap<String, VideoRecord>,
    endless_tokens: bool,
    page_faults: HashMap<Option<String>, VecDeque<Fault>>,
    batch_faults: HashMap<String, VecDeque<Fault>>,
}

#[derive(Debug, Default)]
struct CallLog {
    channel_details: Vec<String>,
    usernames: Vec<String>,
    searches: Vec<String>,
    pages: Vec<PageCall>,
    batches: Vec<Vec<String>>,
}

/// In-memory YouTube API driven by a script.
///
/// Page tokens are the decimal offset of the next item, so the second page of
/// a 50-item pagination carries token `"50"`. Faults are queued per page token
/// (`None` for the first page) and per batch, keyed by the batch's first video ID.
#[derive(Debug, Default)]
pub struct ScriptedYouTube {
    script: Mutex<Script>,
    log: Mutex<CallLog>,
}

impl ScriptedYouTube {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel and its details
    pub fn with_channel(self, identity: ChannelIdentity) -> Self {
        self.script
            .lock()
            .unwrap()
            .channels
            .insert(identity.channel_id.clone(), identity);
        self
    }

    /// Make `username` resolve through the exact-username lookup
    pub fn with_username(self, username: &str, channel_id: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .usernames
            .insert(username.to_string(), channel_id.to_string());
        self
    }

    /// Make a search for `query` return `channel_id`
    pub fn with_search(self, query: &str, channel_id: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .searches
            .insert(query.to_string(), channel_id.to_string());
        self
    }

    /// Register a playlist and the records of its videos, newest first
    pub fn with_playlist(self, playlist_id: &str, videos: Vec<VideoRecord>) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            script.playlists.insert(
                playlist_id.to_string(),
                videos.iter().map(|v| v.video_id.clone()).collect(),
            );
            for video in videos {
                script.videos.insert(video.video_id.clone(), video);
            }
        }
        self
    }

    /// Keep handing out continuation tokens past the end of every playlist;
    /// pages beyond the end carry no `items` key.
    pub fn with_endless_tokens(self) -> Self {
        self.script.lock().unwrap().endless_tokens = true;
        self
    }

    /// Fail the next `times` requests for the page with `token`
    pub fn fail_page(self, token: Option<&str>, fault: Fault, times: usize) -> Self {
        self.script
            .lock()
            .unwrap()
            .page_faults
            .entry(token.map(str::to_string))
            .or_default()
            .extend(std::iter::repeat(fault).take(times));
        self
    }

    /// Fail the next `times` batches whose first video ID is `first_video_id`
    pub fn fail_batch(self, first_video_id: &str, fault: Fault, times: usize) -> Self {
        self.script
            .lock()
            .unwrap()
            .batch_faults
            .entry(first_video_id.to_string())
            .or_default()
            .extend(std::iter::repeat(fault).take(times));
        self
    }

    /// Every `playlist_page` call so far, in order
    pub fn page_calls(&self) -> Vec<PageCall> {
        self.log.lock().unwrap().pages.clone()
    }

    /// Every `videos` call so far, in order
    pub fn batch_calls(&self) -> Vec<Vec<String>> {
        self.log.lock().unwrap().batches.clone()
    }

    /// Number of channel lookups of any kind
    pub fn lookup_count(&self) -> usize {
        let log = self.log.lock().unwrap();
        log.channel_details.len() + log.usernames.len() + log.searches.len()
    }

    /// Channel IDs passed to `channel_details`
    pub fn detail_calls(&self) -> Vec<String> {
        self.log.lock().unwrap().channel_details.clone()
    }

    /// Queries passed to `search_channel`
    pub fn search_calls(&self) -> Vec<String> {
        self.log.lock().unwrap().searches.clone()
    }

    /// Usernames passed to `channel_id_for_username`
    pub fn username_calls(&self) -> Vec<String> {
        self.log.lock().unwrap().usernames.clone()
    }

    /// Total number of remote calls of any kind
    pub fn total_calls(&self) -> usize {
        let log = self.log.lock().unwrap();
        log.channel_details.len()
            + log.usernames.len()
            + log.searches.len()
            + log.pages.len()
            + log.batches.len()
    }
}

#[async_trait]
impl YouTubeApi for ScriptedYouTube {
    async fn channel_details(&self, channel_id: &str) -> Result<Option<ChannelIdentity>> {
        self.log
            .lock()
            .unwrap()
            .channel_details
            .push(channel_id.to_string());
        Ok(self.script.lock().unwrap().channels.get(channel_id).cloned())
    }

    async fn channel_id_for_username(&self, username: &str) -> Result<Option<String>> {
        self.log.lock().unwrap().usernames.push(username.to_string());
        Ok(self.script.lock().unwrap().usernames.get(username).cloned())
    }

    async fn search_channel(&self, query: &str) -> Result<Option<String>> {
        self.log.lock().unwrap().searches.push(query.to_string());
        Ok(self.script.lock().unwrap().searches.get(query).cloned())
    }

    async fn playlist_page(
        &self,
        playlist_id: &str,
        max_results: u32,
        page_token: Option<String>,
    ) -> Result<PlaylistPage> {
        self.log.lock().unwrap().pages.push(PageCall {
            playlist_id: playlist_id.to_string(),
            max_results,
            page_token: page_token.clone(),
        });

        let mut script = self.script.lock().unwrap();
        if let Some(fault) = script
            .page_faults
            .get_mut(&page_token)
            .and_then(VecDeque::pop_front)
        {
            return Err(fault.into_error(&format!("page {:?}", page_token)));
        }

        let ids = script.playlists.get(playlist_id).ok_or_else(|| {
            YtStatsError::remote_api_with_status(format!("playlistNotFound: {playlist_id}"), 404)
        })?;

        let offset: usize = match page_token.as_deref() {
            Some(token) => token
                .parse()
                .map_err(|_| YtStatsError::remote_api_with_status("invalidPageToken", 400))?,
            None => 0,
        };

        if offset >= ids.len() {
            return Ok(PlaylistPage {
                video_ids: if script.endless_tokens { None } else { Some(Vec::new()) },
                next_page_token: script.endless_tokens.then(|| (offset + 1).to_string()),
            });
        }

        let end = (offset + max_results as usize).min(ids.len());
        let next_page_token = if end < ids.len() || script.endless_tokens {
            Some(end.to_string())
        } else {
            None
        };

        Ok(PlaylistPage {
            video_ids: Some(ids[offset..end].to_vec()),
            next_page_token,
        })
    }

    async fn videos(&self, video_ids: &[String]) -> Result<Vec<VideoRecord>> {
        self.log.lock().unwrap().batches.push(video_ids.to_vec());

        let mut script = self.script.lock().unwrap();
        if let Some(first) = video_ids.first() {
            if let Some(fault) = script
                .batch_faults
                .get_mut(first)
                .and_then(VecDeque::pop_front)
            {
                return Err(fault.into_error(&format!("batch starting at {first}")));
            }
        }

        Ok(video_ids
            .iter()
            .filter_map(|id| script.videos.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_pagination_tokens() {
        let api = ScriptedYouTube::new().with_playlist("UUx", fixtures::daily_videos(120));

        let first = api.playlist_page("UUx", 50, None).await.unwrap();
        assert_eq!(first.video_ids.as_ref().unwrap().len(), 50);
        assert_eq!(first.next_page_token.as_deref(), Some("50"));

        let last = api
            .playlist_page("UUx", 50, Some("100".to_string()))
            .await
            .unwrap();
        assert_eq!(last.video_ids.as_ref().unwrap().len(), 20);
        assert!(last.next_page_token.is_none());
        assert_eq!(api.page_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_scripted_faults_are_consumed() {
        let api = ScriptedYouTube::new()
            .with_playlist("UUx", fixtures::daily_videos(3))
            .fail_page(None, Fault::Transport, 1);

        let err = api.playlist_page("UUx", 50, None).await.unwrap_err();
        assert!(err.is_transient());
        assert!(api.playlist_page("UUx", 50, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_scripted_videos_skip_unknown_ids() {
        let api = ScriptedYouTube::new().with_playlist("UUx", fixtures::daily_videos(2));
        let records = api
            .videos(&["v1".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].view_count, 20);
    }

    #[test]
    fn test_fixtures() {
        let channel = fixtures::channel("UC123", "Test");
        assert_eq!(channel.uploads_playlist_id, "UU123");

        let videos = fixtures::daily_videos(2);
        assert_eq!(videos[1].published_at, "2024-01-02T12:00:00Z");
        assert_approx_eq(0.1 + 0.2, 0.3, 1e-9);
    }
}
