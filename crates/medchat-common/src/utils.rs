//! Common utility functions used by the exporter

use crate::constants::{
    FALLBACK_FILENAME_TITLE, FILE_EXTENSION, FILENAME_PLACEHOLDER, formats,
};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Replace every character outside `[A-Za-z0-9]` with the placeholder and
/// keep at most `max_chars` characters
pub fn sanitize_title(title: &str, max_chars: usize) -> String {
    let sanitized: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { FILENAME_PLACEHOLDER })
        .take(max_chars)
        .collect();

    if sanitized.is_empty() {
        FALLBACK_FILENAME_TITLE.to_string()
    } else {
        sanitized
    }
}

/// `{prefix}_{sanitized-title}_{YYYY-MM-DD}.pdf`
pub fn export_filename(
    prefix: &str,
    title: &str,
    max_title_chars: usize,
    exported_at: DateTime<Utc>,
) -> String {
    format!(
        "{}_{}_{}.{}",
        prefix,
        sanitize_title(title, max_title_chars),
        exported_at.format(formats::FILE_DATE),
        FILE_EXTENSION
    )
}

/// Truncate to `max_chars` characters, ending with an ellipsis when cut
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        "...".to_string()
    } else {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", kept.trim_end())
    }
}

/// Parse a message timestamp as emitted by the backend.
///
/// RFC 3339 values keep their offset; naive ISO-8601 values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
