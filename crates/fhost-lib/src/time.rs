//! Timestamp and ttl parsing.
//!
//! Every timestamped store operation receives its instant as an ISO-8601
//! string. Parsing happens here so the store only ever compares
//! [`Timestamp`] values.
//!
//! Accepted forms:
//! - `2023-01-01T00:00:00` (optionally with fractional seconds)
//! - `2023-01-01 00:00:00`
//! - `2023-01-01T00:00`
//! - `2023-01-01T00:00:00Z` / `2023-01-01T02:00:00+02:00` (normalised to UTC)
//! - `2023-01-01` (midnight)

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Absolute instant used for history tags and expiry.
pub type Timestamp = NaiveDateTime;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeError {
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("invalid ttl: {0} seconds")]
    InvalidTtl(f64),
}

/// Parse an ISO-8601 date-time into a [`Timestamp`].
pub fn parse_timestamp(input: &str) -> Result<Timestamp, TimeError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.naive_utc());
    }

    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(ts);
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TimeError::InvalidTimestamp(input.to_string()))
}

/// Convert a ttl in seconds into a duration, keeping millisecond precision.
pub fn ttl_duration(seconds: f64) -> Result<Duration, TimeError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(TimeError::InvalidTtl(seconds));
    }
    let millis = (seconds * 1000.0).round();
    if millis > i64::MAX as f64 {
        return Err(TimeError::InvalidTtl(seconds));
    }
    Duration::try_milliseconds(millis as i64).ok_or(TimeError::InvalidTtl(seconds))
}
