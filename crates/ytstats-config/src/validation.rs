//! Validation utilities and regex patterns

use regex::Regex;
use std::sync::LazyLock;
use validator::ValidationError;
use ytstats_common::RequestedCount;

/// Regex pattern for validating hex color codes (e.g., #FFFFFF, #FF0000)
pub static HEX_COLOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid hex color regex pattern")
});

/// Regex every accepted channel URL must match before resolution is attempted
pub static CHANNEL_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(www\.)?youtube\.com/").expect("Invalid channel URL regex pattern")
});

/// Check a channel URL against `CHANNEL_URL_REGEX`
pub fn is_channel_url(url: &str) -> bool {
    CHANNEL_URL_REGEX.is_match(url.trim())
}

/// Validate a log level or `EnvFilter` directive list
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let base = level.split(',').next().unwrap_or_default().trim();
    match base.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
        // Directive lists such as "ytstats_fetch=debug,info"
        other if other.contains('=') => Ok(()),
        _ => Err(ValidationError::new("invalid_log_level")),
    }
}

/// Validate a default video count (`all` or a multiple of 50 up to 1000)
pub fn validate_requested_count(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<RequestedCount>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_requested_count"))
}

/// Validate file path (basic check for valid path characters)
pub fn validate_file_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::new("empty_file_path"));
    }

    // Colon is allowed for Windows drive letters (C:\)
    let invalid_chars = ['<', '>', '"', '|', '?', '*'];
    if path.chars().any(|c| invalid_chars.contains(&c)) {
        return Err(ValidationError::new("invalid_file_path_characters"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_regex() {
        assert!(HEX_COLOR_REGEX.is_match("#FFFFFF"));
        assert!(HEX_COLOR_REGEX.is_match("#1f77b4"));

        assert!(!HEX_COLOR_REGEX.is_match("FFFFFF")); // Missing #
        assert!(!HEX_COLOR_REGEX.is_match("#FFF"));
        assert!(!HEX_COLOR_REGEX.is_match("#GGGGGG"));
        assert!(!HEX_COLOR_REGEX.is_match(""));
    }

    #[test]
    fn test_channel_url_regex() {
        assert!(is_channel_url("https://www.youtube.com/channel/UC123"));
        assert!(is_channel_url("http://youtube.com/@handle"));
        assert!(is_channel_url("  https://youtube.com/user/legacy  "));

        assert!(!is_channel_url("https://m.youtube.com/@handle"));
        assert!(!is_channel_url("https://youtu.be/abc"));
        assert!(!is_channel_url("ftp://youtube.com/channel/UC1"));
        assert!(!is_channel_url("youtube.com/channel/UC1"));
    }

    #[test]
    fn test_validate_log_level() {
        assert!(validate_log_level("info").is_ok());
        assert!(validate_log_level("DEBUG").is_ok());
        assert!(validate_log_level("ytstats_fetch=trace,info").is_ok());
        assert!(validate_log_level("loud").is_err());
        assert!(validate_log_level("").is_err());
    }

    #[test]
    fn test_validate_requested_count() {
        assert!(validate_requested_count("all").is_ok());
        assert!(validate_requested_count("250").is_ok());
        assert!(validate_requested_count("251").is_err());
        assert!(validate_requested_count("0").is_err());
    }

    #[test]
    fn test_validate_file_path() {
        assert!(validate_file_path("/var/log/ytstats.log").is_ok());
        assert!(validate_file_path("./api.txt").is_ok());
        assert!(validate_file_path("C:\\Users\\me\\api.txt").is_ok());

        assert!(validate_file_path("").is_err());
        assert!(validate_file_path("file<name.txt").is_err());
        assert!(validate_file_path("file|name.txt").is_err());
        assert!(validate_file_path("file?name.txt").is_err());
    }
}
