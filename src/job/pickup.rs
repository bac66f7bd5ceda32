//! Pickup date/time parsing for status messages

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

/// Accepted input layouts, tried in order
const INPUT_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a pickup cell such as `3/16/2024  7:00:00 AM` or `3/19/24 12:00`
/// into the `MM/DD/YYYY` date the remote form expects
///
/// Runs of whitespace are collapsed before parsing. Input that matches none of
/// the accepted layouts is passed through trimmed.
pub fn parse_pickup_date(value: &str) -> String {
    let cleaned = WHITESPACE.replace_all(value.trim(), " ");

    for format in INPUT_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&cleaned, format) {
            return parsed.format("%m/%d/%Y").to_string();
        }
    }

    if !cleaned.is_empty() {
        warn!("Failed to parse pickup date/time: {}", value);
    }
    value.trim().to_string()
}
