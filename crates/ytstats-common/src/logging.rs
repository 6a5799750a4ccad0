//! Structured logging infrastructure for ytstats

use crate::error::{Result, YtStatsError};
use serde::{Deserialize, Serialize};
use std::{fs::File, path::Path};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "ytstats_fetch=trace")
    pub level: String,
    /// Optional file path for log output, in addition to the console
    pub file_path: Option<String>,
    /// Truncate the log file on startup instead of appending
    pub overwrite_file: bool,
    /// Whether to enable JSON formatting
    pub json_format: bool,
    /// Whether to include target module information
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            overwrite_file: true,
            json_format: false,
            include_targets: true,
        }
    }
}

/// Keeps the background log writer alive.
///
/// Dropping the guard flushes buffered file output, so hold it for the
/// lifetime of `main`.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug, Default)]
pub struct LoggingGuard {
    file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// Whether a file writer is attached
    pub fn has_file_output(&self) -> bool {
        self.file_guard.is_some()
    }
}

/// Open the log file, truncating or appending as configured
pub fn open_log_file(path: impl AsRef<Path>, overwrite: bool) -> Result<File> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut options = std::fs::OpenOptions::new();
    options.create(true);
    if overwrite {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    Ok(options.open(path)?)
}

/// Build the environment filter, falling back to `info` on a bad directive
fn build_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| YtStatsError::config_with_source("Invalid log level", e))
}

/// Console layer, written to stderr
fn console_layer(config: &LoggingConfig) -> BoxedLayer {
    if config.json_format {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(config.include_targets)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_targets)
            .with_thread_names(true)
            .boxed()
    }
}

/// Initialize the tracing subscriber with the given configuration
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard> {
    let env_filter = build_filter(&config.level)?;

    let mut layers: Vec<BoxedLayer> = vec![console_layer(config)];
    let mut guard = LoggingGuard::default();

    if let Some(file_path) = &config.file_path {
        let file = open_log_file(file_path, config.overwrite_file)?;
        let (writer, worker_guard) = tracing_appender::non_blocking(file);

        let file_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(config.include_targets)
                .boxed()
        } else {
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(config.include_targets)
                .boxed()
        };
        layers.push(file_layer);
        guard.file_guard = Some(worker_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| YtStatsError::with_source("Failed to install tracing subscriber", e))?;

    Ok(guard)
}

/// Initialize console logging at the default level
pub fn init_default_logging() -> Result<LoggingGuard> {
    init_logging(&LoggingConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.file_path.is_none());
        assert!(config.overwrite_file);
        assert!(!config.json_format);
        assert!(config.include_targets);
    }

    #[test]
    fn test_build_filter_falls_back() {
        assert!(build_filter("debug").is_ok());
        assert!(build_filter("ytstats_fetch=trace,info").is_ok());
        assert!(build_filter("=[not a directive").is_ok());
    }

    #[test]
    fn test_open_log_file_overwrite_and_append() {
        let dir = std::env::temp_dir().join(format!("ytstats-log-{}", std::process::id()));
        let path = dir.join("nested").join("run.log");

        {
            let mut file = open_log_file(&path, true).unwrap();
            writeln!(file, "first run").unwrap();
        }
        {
            let mut file = open_log_file(&path, false).unwrap();
            writeln!(file, "appended").unwrap();
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first run\nappended\n");

        {
            let mut file = open_log_file(&path, true).unwrap();
            writeln!(file, "second run").unwrap();
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "second run\n");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: LoggingConfig =
            serde_json::from_str(r#"{"level": "debug", "file_path": "ytstats.log"}"#).unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.file_path.as_deref(), Some("ytstats.log"));
        assert!(config.overwrite_file);
    }
}
