//! URL intervals and the URL-interval CSV dialect.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::dates;

/// A URL with an optional capture-time window.
///
/// Bounds are inclusive; an absent bound leaves that side of the window
/// unconstrained. Construction validates the ordering of the bounds, so an
/// interval in hand is always well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlInterval {
    url: String,
    earliest: Option<DateTime<Utc>>,
    latest: Option<DateTime<Utc>>,
}

/// The earliest bound of an interval was after the latest.
#[derive(Debug, Error)]
#[error("interval for '{url}' has its earliest bound after its latest bound")]
pub struct ReversedInterval {
    /// The URL of the offending row.
    pub url: String,
}

impl UrlInterval {
    pub fn new(
        url: String,
        earliest: Option<DateTime<Utc>>,
        latest: Option<DateTime<Utc>>,
    ) -> Result<Self, ReversedInterval> {
        if let (Some(earliest), Some(latest)) = (earliest, latest) {
            if earliest > latest {
                return Err(ReversedInterval { url });
            }
        }
        Ok(UrlInterval {
            url,
            earliest,
            latest,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn earliest(&self) -> Option<DateTime<Utc>> {
        self.earliest
    }

    pub fn latest(&self) -> Option<DateTime<Utc>> {
        self.latest
    }

    /// Whether an instant falls inside the window.
    ///
    /// Bounds are inclusive and compared at millisecond resolution; an
    /// absent bound admits everything on its side.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let millis = instant.timestamp_millis();
        if let Some(earliest) = self.earliest {
            if millis < earliest.timestamp_millis() {
                return false;
            }
        }
        if let Some(latest) = self.latest {
            if millis > latest.timestamp_millis() {
                return false;
            }
        }
        true
    }
}

/// Reads the URL-interval CSV dialect: `discriminator;url;earliest;latest`.
///
/// Interval rows are marked `W`; anything else (including the header line)
/// is skipped with a diagnostic. Blank or unparseable date cells leave that
/// side of the window unbounded.
pub struct CsvUrlIntervalReader {
    path: PathBuf,
}

impl CsvUrlIntervalReader {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        CsvUrlIntervalReader { path: path.into() }
    }

    /// Extract every valid interval from the file, in row order.
    pub fn extract_all(&self) -> io::Result<Vec<UrlInterval>> {
        let file = File::open(&self.path)?;
        let mut intervals = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if let Some(interval) = parse_row(&line, index + 1) {
                intervals.push(interval);
            }
        }
        Ok(intervals)
    }
}

fn parse_row(line: &str, number: usize) -> Option<UrlInterval> {
    if line.trim().is_empty() {
        return None;
    }
    let cells: Vec<&str> = line.split(';').map(str::trim).collect();
    if !cells[0].eq_ignore_ascii_case("W") {
        debug!(
            "line {}: skipping row with unrecognized discriminator '{}'",
            number, cells[0]
        );
        return None;
    }
    let url = match cells.get(1) {
        Some(&url) if !url.is_empty() => url.to_owned(),
        _ => {
            warn!("line {}: interval row has an empty URL", number);
            return None;
        }
    };
    let earliest = cells.get(2).and_then(|v| dates::parse_input_date(v));
    let latest = cells.get(3).and_then(|v| dates::parse_input_date(v));
    match UrlInterval::new(url, earliest, latest) {
        Ok(interval) => Some(interval),
        Err(e) => {
            warn!("line {}: {}", number, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn instant(raw: &str) -> DateTime<Utc> {
        dates::parse_input_date(raw).unwrap()
    }

    #[test]
    fn bounds_are_inclusive() {
        let interval = UrlInterval::new(
            "http://example.org/".into(),
            Some(instant("2012-01-01T00:00:00Z")),
            Some(instant("2012-12-31T00:00:00Z")),
        )
        .unwrap();

        assert!(interval.contains(instant("2012-01-01T00:00:00Z")));
        assert!(interval.contains(instant("2012-12-31T00:00:00Z")));
        assert!(interval.contains(instant("2012-06-15T12:00:00Z")));
        assert!(!interval.contains(instant("2011-12-31T23:59:59Z")));
        assert!(!interval.contains(instant("2013-01-01T00:00:00Z")));
    }

    #[test]
    fn absent_bounds_are_unconstrained() {
        let unbounded = UrlInterval::new("http://example.org/".into(), None, None).unwrap();
        assert!(unbounded.contains(instant("1996-01-01T00:00:00Z")));

        let only_latest = UrlInterval::new(
            "http://example.org/".into(),
            None,
            Some(instant("2012-01-01T00:00:00Z")),
        )
        .unwrap();
        assert!(only_latest.contains(instant("1996-01-01T00:00:00Z")));
        assert!(!only_latest.contains(instant("2012-01-01T00:00:01Z")));
    }

    #[test]
    fn reversed_bounds_are_rejected() {
        let result = UrlInterval::new(
            "http://example.org/".into(),
            Some(instant("2013-01-01T00:00:00Z")),
            Some(instant("2012-01-01T00:00:00Z")),
        );
        assert!(result.is_err());
    }

    #[test]
    fn blank_date_cells_leave_the_window_open() {
        let interval = parse_row("W;http://example.org/;;2012-12-31", 1).unwrap();
        assert_eq!(interval.earliest(), None);
        assert_eq!(interval.latest(), Some(instant("2012-12-31T00:00:00Z")));
    }

    #[test]
    fn unparseable_date_cells_leave_the_window_open() {
        let interval = parse_row("W;http://example.org/;whenever;2012-12-31", 1).unwrap();
        assert_eq!(interval.earliest(), None);
    }

    #[test]
    fn reads_rows_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Type;url;earliest;latest").unwrap();
        writeln!(file, "W;http://example.org/;2012-01-01;2012-12-31").unwrap();
        writeln!(file, "W;;2012-01-01;2012-12-31").unwrap();
        writeln!(file, "W;http://example.org/x;2013-01-01;2012-01-01").unwrap();

        let intervals = CsvUrlIntervalReader::new(file.path()).extract_all().unwrap();
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].url(), "http://example.org/");
    }
}
