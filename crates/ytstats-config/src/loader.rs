//! Configuration loading utilities

use crate::Config;
use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;
use tracing::{debug, info};
use ytstats_common::Result as YtStatsResult;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_VAR: &str = "YTSTATS_CONFIG_PATH";

/// Environment variable holding the API key itself
pub const API_KEY_VAR: &str = "YTSTATS_API_KEY";

/// Files searched in the working directory, in order
pub const DEFAULT_CONFIG_FILES: &[&str] = &["ytstats.yaml", "ytstats.yml", "ytstats.toml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading a configuration or key file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The API key file could not be read
    #[error("Failed to read API key file '{path}': {source}")]
    ApiKeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),
}

impl From<ConfigError> for ytstats_common::YtStatsError {
    fn from(err: ConfigError) -> Self {
        ytstats_common::YtStatsError::config_with_source(err.to_string(), err)
    }
}

/// File formats the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension; anything but `.toml` is YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML or TOML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        Self::load_config_with_env(path, |var| env::var(var).ok())
    }

    /// Like `load_config`, reading overrides through `lookup`
    pub fn load_config_with_env<P, F>(path: P, lookup: F) -> Result<Config, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content, ConfigFormat::from_path(path))?;
        debug!("Parsed configuration from {}", path.display());

        Self::apply_env_overrides(&mut config, &lookup)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Parse configuration text in the given format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
        Ok(match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        })
    }

    /// Load configuration following the lookup order: explicit path,
    /// `YTSTATS_CONFIG_PATH`, the default file names, then built-in defaults
    pub fn load(explicit: Option<&Path>) -> YtStatsResult<Config> {
        let lookup = |var: &str| env::var(var).ok();
        let config = match Self::resolve_config_path(explicit, &lookup, |p| p.exists()) {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load_config_with_env(&path, lookup)?
            }
            None => {
                info!("No configuration file found, using defaults");
                Self::defaults_with_env(lookup)?
            }
        };

        Ok(config)
    }

    /// Built-in defaults with environment overrides applied
    pub fn defaults_with_env<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config, &lookup)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Decide which configuration file to load, if any
    pub fn resolve_config_path<F, E>(
        explicit: Option<&Path>,
        lookup: &F,
        exists: E,
    ) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
        E: Fn(&Path) -> bool,
    {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Some(path) = lookup(CONFIG_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            return Some(PathBuf::from(path));
        }

        DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| exists(candidate.as_path()))
    }

    /// Read the API key, preferring `YTSTATS_API_KEY` over the key file
    pub fn load_api_key<P: AsRef<Path>>(path: P) -> YtStatsResult<String> {
        Ok(Self::load_api_key_with_env(path, |var| env::var(var).ok())?)
    }

    /// Like `load_api_key`, reading the override through `lookup`
    pub fn load_api_key_with_env<P, F>(path: P, lookup: F) -> Result<String, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_VAR) {
            let key = key.trim();
            if !key.is_empty() {
                debug!("Using API key from {}", API_KEY_VAR);
                return Ok(key.to_string());
            }
        }

        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ApiKeyFile {
            path: path.display().to_string(),
            source,
        })?;

        let key = content.trim();
        if key.is_empty() {
            return Err(ConfigError::MissingConfig(format!(
                "API key file '{}' is empty",
                path.display()
            )));
        }

        Ok(key.to_string())
    }

    /// Parse an environment variable into `T` when it is set
    fn parse_env<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
        F: Fn(&str) -> Option<String>,
    {
        lookup(var)
            .map(|value| {
                value.trim().parse().map_err(|e| ConfigError::EnvParseError {
                    var: var.to_string(),
                    source: Box::new(e),
                })
            })
            .transpose()
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides<F>(config: &mut Config, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // YouTube API overrides
        if let Some(base_url) = lookup("YTSTATS_API_BASE_URL") {
            config.youtube.base_url = base_url;
        }
        if let Some(key_file) = lookup("YTSTATS_API_KEY_FILE") {
            config.youtube.api_key_file = key_file;
        }
        if let Some(timeout) = Self::parse_env(lookup, "YTSTATS_REQUEST_TIMEOUT")? {
            config.youtube.timeout_seconds = timeout;
        }
        if let Some(rate) = Self::parse_env(lookup, "YTSTATS_RATE_LIMIT")? {
            config.youtube.rate_limit_per_sec = rate;
        }

        // Fetch overrides
        if let Some(retries) = Self::parse_env(lookup, "YTSTATS_MAX_RETRIES")? {
            config.fetch.max_retries = retries;
        }
        if let Some(delay) = Self::parse_env(lookup, "YTSTATS_RETRY_DELAY_MS")? {
            config.fetch.retry_delay_ms = delay;
        }
        if let Some(count) = lookup("YTSTATS_DEFAULT_COUNT") {
            config.fetch.default_count = count;
        }

        // Chart and export overrides
        if let Some(width) = Self::parse_env(lookup, "YTSTATS_CHART_WIDTH")? {
            config.chart.width = width;
        }
        if let Some(height) = Self::parse_env(lookup, "YTSTATS_CHART_HEIGHT")? {
            config.chart.height = height;
        }
        if let Some(directory) = lookup("YTSTATS_EXPORT_DIR") {
            config.export.directory = directory;
        }

        // Logging overrides
        if let Some(level) = lookup("YTSTATS_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(file) = lookup("YTSTATS_LOG_FILE") {
            config.logging.file = if file.trim().is_empty() {
                None
            } else {
                Some(file)
            };
        }
        if let Some(json) = Self::parse_env(lookup, "YTSTATS_LOG_JSON")? {
            config.logging.json_format = json;
        }

        // App overrides
        if let Some(timeout) = Self::parse_env(lookup, "YTSTATS_SHUTDOWN_TIMEOUT")? {
            config.app.shutdown_timeout_seconds = timeout;
        }

        Ok(())
    }
}
