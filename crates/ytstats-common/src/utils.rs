//! Utility functions used across the ytstats application

use crate::Timestamp;
use chrono::Utc;

/// Characters that may not appear in an export filename
const FORBIDDEN_FILENAME_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Get the current timestamp
pub fn now() -> Timestamp {
    Utc::now()
}

/// Remove characters that are not allowed in file names on common platforms
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !FORBIDDEN_FILENAME_CHARS.contains(c))
        .collect()
}
