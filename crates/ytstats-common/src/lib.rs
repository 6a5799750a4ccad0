//! # ytstats Common
//!
//! Shared types, errors, logging and the YouTube Data API client for ytstats.
//!
//! This crate provides the foundational types used across all other crates
//! in the ytstats workspace.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod macros;
pub mod types;
pub mod utils;
pub mod youtube;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

// Re-export commonly used types
pub use error::{Result, YtStatsError};
pub use logging::{init_default_logging, init_logging, LoggingConfig, LoggingGuard};
pub use types::*;
pub use utils::*;
pub use youtube::{
    YouTubeApi, YouTubeClient, YouTubeConfig, DEFAULT_BASE_URL,
};

#[cfg(any(test, feature = "testing"))]
pub use youtube::MockYouTubeApi;
