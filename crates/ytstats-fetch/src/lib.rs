//! # ytstats Fetch
//!
//! Channel resolution and statistics aggregation against the YouTube Data API.
//!
//! Everything here is generic over [`ytstats_common::YouTubeApi`], so the same
//! code runs against the real client and the scripted test double.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod collector;
pub mod resolver;
pub mod retry;
pub mod statistics;

pub use collector::VideoIdCollector;
pub use resolver::{classify, resolve, resolve_channel_id, UrlShape};
pub use retry::RetryPolicy;
pub use statistics::{FailedBatch, StatisticsFetcher, StatisticsOutcome};
