//! Error types and utilities for ytstats

use thiserror::Error;

/// Result type alias for ytstats operations
pub type Result<T> = std::result::Result<T, YtStatsError>;

/// Main error type for ytstats operations
#[derive(Error, Debug)]
pub enum YtStatsError {
    /// The channel URL matches none of the supported shapes
    #[error("Invalid YouTube channel URL format: {url}")]
    InvalidUrlFormat { url: String },

    /// A username, handle or search lookup found no channel
    #[error("Channel resolution failed: {message}")]
    Resolution { message: String },

    /// The channel ID does not exist
    #[error("Channel not found for ID: {channel_id}")]
    ChannelNotFound { channel_id: String },

    /// A transport fault that persisted through every retry
    #[error("Transient transport error after {attempts} attempt(s): {message}")]
    TransientTransport {
        message: String,
        attempts: usize,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Non-transient failure reported by the remote API
    #[error("YouTube API error: {message}")]
    RemoteApi {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Chart rendering errors
    #[error("Graph error: {message}")]
    Graph {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Spreadsheet export errors
    #[error("Export error: {message}")]
    Export {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl YtStatsError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid URL format error
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrlFormat { url: url.into() }
    }

    /// Create a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution {
            message: msg.into(),
        }
    }

    /// Create a channel-not-found error
    pub fn channel_not_found(channel_id: impl Into<String>) -> Self {
        Self::ChannelNotFound {
            channel_id: channel_id.into(),
        }
    }

    /// Create a transient transport error for a single failed attempt
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::TransientTransport {
            message: msg.into(),
            attempts: 1,
            source: None,
        }
    }

    /// Create a transient transport error with source
    pub fn transient_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::TransientTransport {
            message: msg.into(),
            attempts: 1,
            source: Some(Box::new(source)),
        }
    }

    /// Create a new remote API error
    pub fn remote_api(msg: impl Into<String>) -> Self {
        Self::RemoteApi {
            message: msg.into(),
            status_code: None,
            source: None,
        }
    }

    /// Create a new remote API error with HTTP status code
    pub fn remote_api_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::RemoteApi {
            message: msg.into(),
            status_code: Some(status),
            source: None,
        }
    }

    /// Create a new remote API error with source
    pub fn remote_api_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::RemoteApi {
            message: msg.into(),
            status_code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new graph error with source
    pub fn graph_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Graph {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new export error
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new export error with source
    pub fn export_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Export {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Whether this error is a transport fault worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientTransport { .. })
    }

    /// Stamp the number of attempts made onto a transient error.
    ///
    /// Other variants are returned unchanged.
    pub fn with_attempts(self, total: usize) -> Self {
        match self {
            Self::TransientTransport {
                message, source, ..
            } => Self::TransientTransport {
                message,
                attempts: total,
                source,
            },
            other => other,
        }
    }
}

// Error conversion implementations for external types

/// Convert from reqwest::Error to YtStatsError.
///
/// Failures to establish or keep the secure connection (refused connections,
/// TLS handshake failures, resets while reading the body) are transient.
/// Timeouts and everything else are remote API errors.
impl From<reqwest::Error> for YtStatsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::remote_api_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::transient_with_source("Connection failed", err)
        } else if err.is_body() || (err.is_request() && !err.is_builder()) {
            Self::transient_with_source("Connection interrupted", err)
        } else if err.is_status() {
            let status_code = err.status().map(|s| s.as_u16()).unwrap_or(0);
            Self::RemoteApi {
                message: format!("HTTP error: {}", status_code),
                status_code: Some(status_code),
                source: Some(Box::new(err)),
            }
        } else if err.is_decode() {
            Self::remote_api_with_source("Malformed response body", err)
        } else {
            Self::remote_api_with_source("Request failed", err)
        }
    }
}

#[cfg(feature = "plotters")]
/// Convert from plotters drawing errors to YtStatsError
impl<T> From<plotters::drawing::DrawingAreaErrorKind<T>> for YtStatsError
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        Self::graph_with_source("Graph rendering failed", err)
    }
}

#[cfg(feature = "xlsx")]
/// Convert from rust_xlsxwriter errors to YtStatsError
impl From<rust_xlsxwriter::XlsxError> for YtStatsError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::export_with_source("Spreadsheet write failed", err)
    }
}
