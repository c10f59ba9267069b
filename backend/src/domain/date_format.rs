//! Human-readable rendering of stored timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Rendered when no timestamp is available.
pub const UNKNOWN_DATE: &str = "Unknown date";
/// Rendered when a timestamp cannot be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

/// Format an ISO-8601 timestamp as `Month D, YYYY` in UTC.
///
/// Accepts RFC 3339 timestamps, offset-less date-times (read as UTC), and
/// bare `YYYY-MM-DD` dates.
///
/// # Examples
/// ```
/// use blog_backend::domain::format_date;
///
/// assert_eq!(format_date(Some("2024-03-05T00:00:00Z")), "March 5, 2024");
/// assert_eq!(format_date(None), "Unknown date");
/// ```
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return UNKNOWN_DATE.to_owned();
    };
    parse_timestamp(raw).map_or_else(|| INVALID_DATE.to_owned(), format_timestamp)
}

/// Format an already-parsed timestamp as `Month D, YYYY`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%B %-d, %Y").to_string()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}
