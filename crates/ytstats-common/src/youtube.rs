//! YouTube Data API v3 client with connection pooling and rate limiting
//!
//! The client performs exactly one HTTP attempt per call. Transport failures
//! come back as `YtStatsError::TransientTransport` so callers can apply their
//! own retry policy; HTTP error statuses and malformed bodies come back as
//! `YtStatsError::RemoteApi`.

use crate::{
    error::{Result, YtStatsError},
    types::{ChannelIdentity, PlaylistPage, VideoRecord, MAX_BATCH_SIZE, MAX_PAGE_SIZE},
};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize};
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tracing::{debug, instrument, warn};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Remote operations the resolver and aggregator depend on
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait YouTubeApi: Send + Sync {
    /// Look up a channel by ID; `Ok(None)` when it does not exist
    async fn channel_details(&self, channel_id: &str) -> Result<Option<ChannelIdentity>>;

    /// Exact legacy-username lookup, returning the channel ID
    async fn channel_id_for_username(&self, username: &str) -> Result<Option<String>>;

    /// Free-text channel search, returning the first hit's channel ID
    async fn search_channel(&self, query: &str) -> Result<Option<String>>;

    /// Fetch one page of a playlist
    async fn playlist_page(
        &self,
        playlist_id: &str,
        max_results: u32,
        page_token: Option<String>,
    ) -> Result<PlaylistPage>;

    /// Fetch statistics and snippets for up to 50 videos
    async fn videos(&self, video_ids: &[String]) -> Result<Vec<VideoRecord>>;
}

/// Configuration for the YouTube API client
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    /// API root, overridable for tests and proxies
    pub base_url: String,
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Connection pool max idle connections per host (default: 10)
    pub max_idle_per_host: usize,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u32,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            max_idle_per_host: 10,
            rate_limit_per_sec: 10,
        }
    }
}

impl YouTubeConfig {
    /// Create a new configuration against the public API
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the connection pool size
    pub fn with_pool_size(mut self, max_idle_per_host: usize) -> Self {
        self.max_idle_per_host = max_idle_per_host;
        self
    }

    /// Set the rate limit
    pub fn with_rate_limit(mut self, rate_limit_per_sec: u32) -> Self {
        self.rate_limit_per_sec = rate_limit_per_sec;
        self
    }
}

/// YouTube API client with connection pooling and rate limiting
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    config: YouTubeConfig,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl YouTubeClient {
    /// Create a new client with the given configuration
    pub fn new(config: YouTubeConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(YtStatsError::config("YouTube API key must not be empty"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| YtStatsError::config_with_source("Failed to create HTTP client", e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| YtStatsError::config("Rate limit must be greater than 0"))?,
        );
        let rate_limiter = Arc::new(DefaultDirectRateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    fn build_url(&self, resource: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), resource)
    }

    /// Issue one GET against `resource` and decode the JSON body
    #[instrument(skip(self, params), fields(resource = %resource))]
    async fn get_json<T>(&self, resource: &str, params: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.rate_limiter.until_ready().await;

        let url = self.build_url(resource);
        let mut query: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 1);
        query.extend_from_slice(params);
        query.push(("key", self.config.api_key.as_str()));

        debug!("Requesting {} with {} parameters", url, params.len());
        let response = self.client.get(&url).query(&query).send().await?;
        let response = Self::check_status(response).await?;

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| YtStatsError::remote_api_with_source("Malformed response body", e))
    }

    /// Turn an HTTP error status into a `RemoteApi` error carrying Google's message
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| format!("API returned status {}", status));

        warn!(status = status.as_u16(), "Request rejected: {}", message);
        Err(YtStatsError::remote_api_with_status(message, status.as_u16()))
    }
}

#[async_trait]
impl YouTubeApi for YouTubeClient {
    #[instrument(skip(self))]
    async fn channel_details(&self, channel_id: &str) -> Result<Option<ChannelIdentity>> {
        let response: ChannelListResponse = self
            .get_json(
                "channels",
                &[("part", "contentDetails,snippet"), ("id", channel_id)],
            )
            .await?;

        let Some(item) = response.items.and_then(|items| items.into_iter().next()) else {
            return Ok(None);
        };

        let uploads = item
            .content_details
            .and_then(|d| d.related_playlists)
            .and_then(|p| p.uploads)
            .ok_or_else(|| {
                YtStatsError::remote_api(format!(
                    "Channel {} has no uploads playlist",
                    channel_id
                ))
            })?;

        Ok(Some(ChannelIdentity {
            channel_id: item.id,
            uploads_playlist_id: uploads,
            title: item.snippet.map(|s| s.title).unwrap_or_default(),
        }))
    }

    #[instrument(skip(self))]
    async fn channel_id_for_username(&self, username: &str) -> Result<Option<String>> {
        let response: ChannelListResponse = self
            .get_json("channels", &[("part", "id"), ("forUsername", username)])
            .await?;

        Ok(response
            .items
            .and_then(|items| items.into_iter().next())
            .map(|item| item.id))
    }

    #[instrument(skip(self))]
    async fn search_channel(&self, query: &str) -> Result<Option<String>> {
        let response: SearchListResponse = self
            .get_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("type", "channel"),
                    ("maxResults", "1"),
                    ("q", query),
                ],
            )
            .await?;

        Ok(response
            .items
            .and_then(|items| items.into_iter().next())
            .map(|item| item.snippet.channel_id))
    }

    #[instrument(skip(self))]
    async fn playlist_page(
        &self,
        playlist_id: &str,
        max_results: u32,
        page_token: Option<String>,
    ) -> Result<PlaylistPage> {
        let max_results = max_results.clamp(1, MAX_PAGE_SIZE).to_string();
        let mut params = vec![
            ("part", "contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token.as_deref() {
            params.push(("pageToken", token));
        }

        let response: PlaylistItemListResponse = self.get_json("playlistItems", &params).await?;
        Ok(response.into())
    }

    #[instrument(skip(self, video_ids), fields(batch_size = video_ids.len()))]
    async fn videos(&self, video_ids: &[String]) -> Result<Vec<VideoRecord>> {
        if video_ids.len() > MAX_BATCH_SIZE {
            return Err(YtStatsError::validation_field(
                format!(
                    "At most {} video IDs per request, got {}",
                    MAX_BATCH_SIZE,
                    video_ids.len()
                ),
                "video_ids",
            ));
        }

        let ids = video_ids.join(",");
        let response: VideoListResponse = self
            .get_json("videos", &[("part", "statistics,snippet"), ("id", ids.as_str())])
            .await?;

        Ok(response
            .items
            .unwrap_or_default()
            .into_iter()
            .map(VideoRecord::from)
            .collect())
    }
}

// ============================================================================
// API Response Models
// ============================================================================

/// Error body returned by Google APIs
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<u16>,
    pub message: Option<String>,
}

/// Response of `channels.list`
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelListResponse {
    pub items: Option<Vec<ChannelItem>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItem {
    pub id: String,
    pub snippet: Option<ChannelSnippet>,
    pub content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSnippet {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    pub related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedPlaylists {
    pub uploads: Option<String>,
}

/// Response of `search.list`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchListResponse {
    pub items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub snippet: SearchSnippet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSnippet {
    #[serde(rename = "channelId")]
    pub channel_id: String,
}

/// Response of `playlistItems.list`
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItemListResponse {
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
    pub items: Option<Vec<PlaylistItem>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItemContentDetails {
    #[serde(rename = "videoId")]
    pub video_id: String,
}

impl From<PlaylistItemListResponse> for PlaylistPage {
    fn from(response: PlaylistItemListResponse) -> Self {
        Self {
            video_ids: response.items.map(|items| {
                items
                    .into_iter()
                    .map(|item| item.content_details.video_id)
                    .collect()
            }),
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        }
    }
}

/// Response of `videos.list`
#[derive(Debug, Clone, Deserialize)]
pub struct VideoListResponse {
    pub items: Option<Vec<VideoItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub snippet: VideoSnippet,
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoSnippet {
    pub title: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
}

/// Counters are encoded as decimal strings by the API
#[derive(Debug, Clone, Deserialize)]
pub struct VideoStatistics {
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
}

impl From<VideoItem> for VideoRecord {
    fn from(item: VideoItem) -> Self {
        let view_count = item
            .statistics
            .and_then(|s| s.view_count)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        Self {
            video_id: item.id,
            title: item.snippet.title,
            view_count,
            published_at: item.snippet.published_at,
        }
    }
}
