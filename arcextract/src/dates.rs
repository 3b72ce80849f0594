//! Lenient parsing of dates found in identifier CSV files.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// The expected format for input dates, e.g. `2012-04-02T23:52:39Z`.
const INPUT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Fallback format for bare dates, e.g. `2012-04-02`, read as midnight UTC.
const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Extract an instant from an input date cell, best effort.
///
/// Tries the full timestamp format first, then the bare-date fallback. A
/// value neither format matches yields None with a logged diagnostic, as
/// does an empty cell. Callers decide whether an absent date invalidates
/// the row (a capture timestamp) or merely widens a window (an interval
/// bound).
pub fn parse_input_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, INPUT_DATE_FORMAT) {
        return Some(Utc.from_utc_datetime(&naive));
    }
    match NaiveDate::parse_from_str(trimmed, FALLBACK_DATE_FORMAT) {
        Ok(date) => {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            Some(Utc.from_utc_datetime(&midnight))
        }
        Err(_) => {
            warn!(
                "could not parse date '{}' with either supported format",
                trimmed
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_timestamp() {
        let parsed = parse_input_date("2012-04-02T23:52:39Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2012-04-02T23:52:39+00:00");
    }

    #[test]
    fn falls_back_to_bare_date() {
        let parsed = parse_input_date("2012-04-02").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2012-04-02T00:00:00+00:00");
    }

    #[test]
    fn blank_and_garbage_are_absent() {
        assert_eq!(parse_input_date(""), None);
        assert_eq!(parse_input_date("   "), None);
        assert_eq!(parse_input_date("two days ago"), None);
        assert_eq!(parse_input_date("02/04/2012"), None);
    }
}
