//! Row-to-scalar conversion helpers shared by introspection and insertion.

use chrono::{DateTime, Utc};

use crate::error::SqlError;

/// Parse a TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and SQLite's
/// default `datetime('now')` format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns [`SqlError::Parse`] if the string matches neither format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, SqlError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| SqlError::Parse(format!("datetime '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and the
/// empty string, since `row.get::<String>(idx)` on a NULL column errors
/// rather than returning `""`.
///
/// # Errors
///
/// Returns an error if the column read itself fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, libsql::Error> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}
