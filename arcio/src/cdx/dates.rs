//! The 14-digit wayback timestamp format used by CDX files.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// CDX date format string as specified in the CDX documentation.
pub const CDX_DATE_FORMAT: &str = "%Y%m%d%H%M%S";

/// Format an instant as a wayback timestamp, e.g. `20120402235239`.
pub fn format_wayback(instant: &DateTime<Utc>) -> String {
    instant.format(CDX_DATE_FORMAT).to_string()
}

/// Parse a wayback timestamp into a UTC instant.
pub fn parse_wayback(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let naive = NaiveDateTime::parse_from_str(raw, CDX_DATE_FORMAT)?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Format an instant the way WARC headers expect it, e.g. `2012-04-02T23:52:39Z`.
pub fn format_warc(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
