//! Application configuration structures

use serde::{Deserialize, Serialize};
use validator::Validate;
use ytstats_common::{LoggingConfig, RequestedCount, YouTubeConfig, DEFAULT_BASE_URL};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// YouTube Data API access
    #[validate]
    pub youtube: YouTubeSettings,

    /// Pagination, batching and retry behaviour
    #[validate]
    pub fetch: FetchSettings,

    /// Chart rendering settings
    #[validate]
    pub chart: ChartSettings,

    /// Spreadsheet export settings
    #[validate]
    pub export: ExportSettings,

    /// Logging configuration
    #[validate]
    pub logging: LoggingSettings,

    /// Background task behaviour
    #[validate]
    pub app: AppSettings,
}

/// YouTube Data API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct YouTubeSettings {
    /// API root
    #[validate(url(message = "API base URL must be a valid URL"))]
    pub base_url: String,

    /// File holding the API key
    #[validate(custom(
        function = "crate::validation::validate_file_path",
        message = "API key file path contains invalid characters"
    ))]
    pub api_key_file: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Idle connections kept per host
    #[validate(range(min = 1, max = 100, message = "Pool size must be between 1 and 100"))]
    pub max_idle_per_host: usize,

    /// Client-side request rate
    #[validate(range(min = 1, max = 1000, message = "Rate limit must be between 1 and 1000 requests per second"))]
    pub rate_limit_per_sec: u32,
}

/// Statistics aggregation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FetchSettings {
    /// Retries after a transient transport failure, per page or batch
    #[validate(range(max = 10, message = "Max retries cannot exceed 10"))]
    pub max_retries: usize,

    /// Fixed delay between retries in milliseconds
    #[validate(range(max = 60000, message = "Retry delay cannot exceed 60000 ms"))]
    pub retry_delay_ms: u64,

    /// Items requested per playlist page
    #[validate(range(min = 1, max = 50, message = "Page size must be between 1 and 50"))]
    pub page_size: u32,

    /// Video IDs per statistics request
    #[validate(range(min = 1, max = 50, message = "Batch size must be between 1 and 50"))]
    pub batch_size: usize,

    /// Count used when the command line does not give one
    #[validate(custom(
        function = "crate::validation::validate_requested_count",
        message = "Default count must be 'all' or a multiple of 50 up to 1000"
    ))]
    pub default_count: String,
}

/// Chart rendering configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ChartSettings {
    /// Chart width in pixels
    #[validate(range(min = 200, max = 4000, message = "Width must be between 200 and 4000 pixels"))]
    pub width: u32,

    /// Chart height in pixels
    #[validate(range(min = 200, max = 4000, message = "Height must be between 200 and 4000 pixels"))]
    pub height: u32,

    /// Background color (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Background color must be valid hex color"))]
    pub background_color: String,

    /// View count line color (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "View count color must be valid hex color"))]
    pub view_count_color: String,

    /// Moving average line color (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Moving average color must be valid hex color"))]
    pub moving_average_color: String,

    /// Whether to show grid lines
    pub show_grid: bool,

    /// Whether to mark each video on the view count line
    pub show_points: bool,
}

/// Spreadsheet export configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory workbooks are written into
    #[validate(custom(
        function = "crate::validation::validate_file_path",
        message = "Export directory contains invalid characters"
    ))]
    pub directory: String,

    /// Embedded chart width in pixels
    #[validate(range(min = 200, max = 4000, message = "Chart width must be between 200 and 4000 pixels"))]
    pub chart_width: u32,

    /// Embedded chart height in pixels
    #[validate(range(min = 100, max = 4000, message = "Chart height must be between 100 and 4000 pixels"))]
    pub chart_height: u32,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error) or a directive list
    #[validate(custom(
        function = "crate::validation::validate_log_level",
        message = "Log level must be one of: trace, debug, info, warn, error"
    ))]
    pub level: String,

    /// Optional log file path
    pub file: Option<String>,

    /// Truncate the log file on every run
    pub overwrite_file: bool,

    /// Emit JSON lines
    pub json_format: bool,

    /// Include the module target in each line
    pub include_targets: bool,
}

/// Background analysis configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppSettings {
    /// How long shutdown waits for an in-flight analysis
    #[validate(range(min = 1, max = 300, message = "Shutdown timeout must be between 1 and 300 seconds"))]
    pub shutdown_timeout_seconds: u64,

    /// Buffered progress events between the task and the caller
    #[validate(range(min = 1, max = 1024, message = "Event buffer must be between 1 and 1024"))]
    pub event_buffer: usize,
}

impl Config {
    /// Comprehensive validation of the entire configuration
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()
    }
}

impl Default for YouTubeSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_file: "api.txt".to_string(),
            timeout_seconds: 30,
            max_idle_per_host: 10,
            rate_limit_per_sec: 10,
        }
    }
}

impl YouTubeSettings {
    /// Client configuration for the given key
    pub fn client_config(&self, api_key: impl Into<String>) -> YouTubeConfig {
        YouTubeConfig::new(api_key)
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout_seconds)
            .with_pool_size(self.max_idle_per_host)
            .with_rate_limit(self.rate_limit_per_sec)
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 0,
            page_size: 50,
            batch_size: 50,
            default_count: "all".to_string(),
        }
    }
}

impl FetchSettings {
    /// Parsed `default_count`, falling back to `All` if it does not parse
    pub fn default_requested_count(&self) -> RequestedCount {
        self.default_count.parse().unwrap_or_default()
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 700,
            background_color: "#FFFFFF".to_string(),
            view_count_color: "#1F77B4".to_string(),
            moving_average_color: "#FF7F0E".to_string(),
            show_grid: true,
            show_points: true,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            chart_width: 960,
            chart_height: 480,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("ytstats.log".to_string()),
            overwrite_file: true,
            json_format: false,
            include_targets: true,
        }
    }
}

impl From<&LoggingSettings> for LoggingConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            level: settings.level.clone(),
            file_path: settings.file.clone(),
            overwrite_file: settings.overwrite_file,
            json_format: settings.json_format,
            include_targets: settings.include_targets,
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            shutdown_timeout_seconds: 10,
            event_buffer: 64,
        }
    }
}
