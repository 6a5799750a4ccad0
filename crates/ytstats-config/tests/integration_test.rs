//! Integration tests for ytstats-config crate.

use std::io::Write;
use tempfile::Builder;
use ytstats_config::{ConfigFormat, ConfigLoader};

const FULL_YAML: &str = r##"
youtube:
  base_url: "https://www.googleapis.com/youtube/v3"
  api_key_file: "api.txt"
  timeout_seconds: 30
  max_idle_per_host: 10
  rate_limit_per_sec: 10
fetch:
  max_retries: 3
  retry_delay_ms: 0
  page_size: 50
  batch_size: 50
  default_count: "all"
chart:
  width: 1200
  height: 700
  background_color: "#FFFFFF"
  view_count_color: "#1F77B4"
  moving_average_color: "#FF7F0E"
  show_grid: true
  show_points: true
export:
  directory: "."
  chart_width: 960
  chart_height: 480
logging:
  level: "info"
  file: "ytstats.log"
  overwrite_file: true
  json_format: false
  include_targets: true
app:
  shutdown_timeout_seconds: 10
  event_buffer: 64
"##;

#[test]
fn test_full_yaml_matches_defaults() {
    let parsed = ConfigLoader::parse(FULL_YAML, ConfigFormat::Yaml).unwrap();
    assert_eq!(parsed, ytstats_config::Config::default());
}

#[test]
fn test_yaml_and_toml_agree() {
    let from_yaml = ConfigLoader::parse(FULL_YAML, ConfigFormat::Yaml).unwrap();
    let as_toml = toml::to_string(&from_yaml).unwrap();
    let from_toml = ConfigLoader::parse(&as_toml, ConfigFormat::Toml).unwrap();
    assert_eq!(from_yaml, from_toml);
}

#[test]
fn test_format_from_extension() {
    use std::path::Path;
    assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
    assert_eq!(ConfigFormat::from_path(Path::new("a.TOML")), ConfigFormat::Toml);
    assert_eq!(ConfigFormat::from_path(Path::new("a.yml")), ConfigFormat::Yaml);
    assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Yaml);
}

#[test]
fn test_empty_file_yields_defaults() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(b"").unwrap();

    let config = ConfigLoader::load_config_with_env(file.path(), |_| None).unwrap();
    assert_eq!(config, ytstats_config::Config::default());
}
