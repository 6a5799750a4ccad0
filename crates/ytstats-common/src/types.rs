//! Common types used across the ytstats application

use crate::error::{Result, YtStatsError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, num::NonZeroUsize, str::FromStr};

/// Timestamp type used throughout the application
pub type Timestamp = DateTime<Utc>;

/// Largest page size the playlist items endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 50;

/// Largest number of video IDs accepted by a single videos lookup
pub const MAX_BATCH_SIZE: usize = 50;

/// Step between the selectable video counts
pub const COUNT_STEP: usize = 50;

/// Largest selectable video count short of `All`
pub const MAX_SELECTABLE_COUNT: usize = 1000;

/// A resolved channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelIdentity {
    pub channel_id: String,
    pub uploads_playlist_id: String,
    pub title: String,
}

/// View statistics for one video as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub view_count: u64,
    /// Upload timestamp text (RFC 3339)
    pub published_at: String,
}

/// One page of an uploads playlist.
///
/// `video_ids` is `None` when the response carried no `items` key at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistPage {
    pub video_ids: Option<Vec<String>>,
    pub next_page_token: Option<String>,
}

/// How many of a channel's most recent uploads to analyse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestedCount {
    /// Every upload in the playlist
    All,
    /// The first N items in the playlist's default (newest first) order
    Last(NonZeroUsize),
}

impl RequestedCount {
    /// Create a `Last(n)` count, rejecting zero
    pub fn last(n: usize) -> Result<Self> {
        NonZeroUsize::new(n)
            .map(Self::Last)
            .ok_or_else(|| YtStatsError::validation_field("Video count must be at least 1", "count"))
    }

    /// Target number of IDs, or `None` for all of them
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::All => None,
            Self::Last(n) => Some(n.get()),
        }
    }

    /// The values offered by the count selector, `All` last
    pub fn choices() -> Vec<Self> {
        (COUNT_STEP..=MAX_SELECTABLE_COUNT)
            .step_by(COUNT_STEP)
            .filter_map(NonZeroUsize::new)
            .map(Self::Last)
            .chain(std::iter::once(Self::All))
            .collect()
    }
}

impl Default for RequestedCount {
    fn default() -> Self {
        Self::All
    }
}

impl fmt::Display for RequestedCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Last(n) => write!(f, "{}", n),
        }
    }
}

/// Parses `all` (any case) or a positive multiple of 50 up to 1000
impl FromStr for RequestedCount {
    type Err = YtStatsError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        let n: usize = trimmed.parse().map_err(|_| {
            YtStatsError::validation_field(
                format!("Invalid video count '{}': expected 'all' or a number", trimmed),
                "count",
            )
        })?;

        if n == 0 || n % COUNT_STEP != 0 || n > MAX_SELECTABLE_COUNT {
            return Err(YtStatsError::validation_field(
                format!(
                    "Invalid video count {}: must be a multiple of {} between {} and {}",
                    n, COUNT_STEP, COUNT_STEP, MAX_SELECTABLE_COUNT
                ),
                "count",
            ));
        }

        Self::last(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_count_parsing() {
        assert_eq!("all".parse::<RequestedCount>().unwrap(), RequestedCount::All);
        assert_eq!("All".parse::<RequestedCount>().unwrap(), RequestedCount::All);
        assert_eq!(
            "150".parse::<RequestedCount>().unwrap(),
            RequestedCount::last(150).unwrap()
        );
        assert_eq!(
            " 1000 ".parse::<RequestedCount>().unwrap().limit(),
            Some(1000)
        );

        assert!("0".parse::<RequestedCount>().is_err());
        assert!("75".parse::<RequestedCount>().is_err());
        assert!("1050".parse::<RequestedCount>().is_err());
        assert!("many".parse::<RequestedCount>().is_err());
        assert!("-50".parse::<RequestedCount>().is_err());
    }

    #[test]
    fn test_requested_count_display() {
        assert_eq!(RequestedCount::All.to_string(), "All");
        assert_eq!(RequestedCount::last(200).unwrap().to_string(), "200");
    }

    #[test]
    fn test_requested_count_last_rejects_zero() {
        assert!(RequestedCount::last(0).is_err());
        assert_eq!(RequestedCount::last(7).unwrap().limit(), Some(7));
        assert_eq!(RequestedCount::All.limit(), None);
    }

    #[test]
    fn test_choices() {
        let choices = RequestedCount::choices();
        assert_eq!(choices.len(), 21);
        assert_eq!(choices[0].limit(), Some(50));
        assert_eq!(choices[19].limit(), Some(1000));
        assert_eq!(choices[20], RequestedCount::All);
    }
}
