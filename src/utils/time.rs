use crate::error::{config_error, AppResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, ParseError};

/// Formats carrying an explicit UTC offset, tried after RFC 3339
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Formats without an offset; interpreted as UTC
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp.
///
/// A literal `Z` is rewritten to `+00:00` before parsing. Timestamps without
/// an offset, and bare dates, are taken as UTC.
pub fn parse_iso8601(value: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    let normalized = value.replace('Z', "+00:00");

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt);
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Ok(dt);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    let date = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")?;
    Ok(date.and_time(NaiveTime::MIN).and_utc().fixed_offset())
}

/// Requested sync window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl DateRange {
    /// Parse both ends of the window
    pub fn parse(start: &str, end: &str) -> AppResult<Self> {
        Ok(DateRange {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        })
    }
}

fn parse_bound(value: &str) -> AppResult<DateTime<FixedOffset>> {
    parse_iso8601(value).map_err(|e| {
        config_error(&format!(
            "Invalid date format received: invalid isoformat string {value:?}: {e}"
        ))
    })
}
