//! # ytstats Config
//!
//! Configuration schema, validation and loading for ytstats.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{ConfigError, ConfigFormat, ConfigLoader};
pub use settings::{
    AppSettings, ChartSettings, Config, ExportSettings, FetchSettings, LoggingSettings,
    YouTubeSettings,
};
pub use validation::is_channel_url;
