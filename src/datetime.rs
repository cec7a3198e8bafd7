//! Date/time utilities for fileshare.
//!
//! Timestamps are stored in the database as fixed-width UTC text
//! (`YYYY-MM-DD HH:MM:SS.ffffff`) so that lexical and chronological
//! order agree.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

const DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Default display format for listings.
pub const DISPLAY_FORMAT: &str = "%b %d, %Y %H:%M";

/// Format a UTC timestamp for storage.
pub fn to_db_string(dt: &DateTime<Utc>) -> String {
    dt.format(DB_FORMAT).to_string()
}

/// Parse a timestamp written by [`to_db_string`].
///
/// Also accepts SQLite's `datetime('now')` format without fractional seconds.
pub fn from_db_string(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, DB_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a UTC timestamp as RFC3339 for API responses.
pub fn to_rfc3339(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Format a DateTime<Utc> in the given timezone.
///
/// Falls back to UTC when the timezone name is unknown.
pub fn format_utc_datetime(dt: &DateTime<Utc>, timezone: &str, format: &str) -> String {
    let tz: Tz = match timezone.parse() {
        Ok(tz) => tz,
        Err(_) => return dt.format(format).to_string(),
    };
    dt.with_timezone(&tz).format(format).to_string()
}
