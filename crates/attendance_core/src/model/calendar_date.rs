//! Calendar-date normalization for wire inputs.
//!
//! # Responsibility
//! - Parse ISO-8601 dates and date-times coming across the boundary.
//! - Reduce every instant to the calendar date of the deployment zone.
//!
//! # Invariants
//! - Two inputs compare equal iff they land on the same local date in the
//!   configured zone. Time of day never participates in equality.
//! - Storage keys are always `YYYY-MM-DD`.

use super::validation::ValidationError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a wire date into a calendar date in `zone`.
///
/// Accepted forms:
/// - `2024-03-01`
/// - `2024-03-01T23:00:00Z` / `2024-03-01T01:00:00+05:00` (converted into `zone`)
/// - `2024-03-01T09:30:00` (wall time, already in `zone`)
///
/// # Errors
/// - `MissingDate` for empty input.
/// - `InvalidDate` for anything else that does not parse.
pub fn parse_calendar_date(input: &str, zone: &FixedOffset) -> Result<NaiveDate, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingDate);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_KEY_FORMAT) {
        return Ok(date);
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(zone).date_naive());
    }

    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|wall_time| wall_time.date())
        .ok_or_else(|| ValidationError::InvalidDate(trimmed.to_string()))
}

/// Returns the calendar date of `instant` as observed in `zone`.
pub fn calendar_date_of(instant: DateTime<Utc>, zone: &FixedOffset) -> NaiveDate {
    instant.with_timezone(zone).date_naive()
}

/// Formats a calendar date as its storage key.
pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parses a storage key written by [`format_date_key`].
pub fn parse_date_key(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_KEY_FORMAT).ok()
}
