//! Web identifiers and the WID CSV dialect.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::dates;

/// A web identifier: one input row pointing at a single capture.
///
/// The two shapes are mutually exclusive by construction; a row that has
/// neither a valid job/offset pair nor a valid URL/timestamp pair is not an
/// identifier and is rejected at parse time rather than defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wid {
    /// A capture named by its position inside a harvest job's containers.
    JobOffset {
        /// The producing harvest job. Always positive.
        job_id: u64,
        /// Byte offset of the record inside the job's container.
        file_offset: u64,
    },
    /// A capture named by logical address and capture time.
    UrlDate {
        /// The captured URL.
        url: String,
        /// The capture instant, seconds resolution.
        timestamp: DateTime<Utc>,
    },
}

/// Reads the WID CSV dialect: `discriminator;#;url;date;location;filename`.
///
/// `W` rows carry a job/offset pair (job id in the `#` column, offset in the
/// `location` column); `X` rows carry a URL and capture date. Rows with any
/// other discriminator — including the header line — are skipped with a
/// diagnostic, so a header-only file simply yields no identifiers.
pub struct CsvWidReader {
    path: PathBuf,
}

impl CsvWidReader {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        CsvWidReader { path: path.into() }
    }

    /// Extract every valid identifier from the file, in row order.
    ///
    /// Malformed rows are skipped with a logged diagnostic; only failing to
    /// read the file itself is an error.
    pub fn extract_all(&self) -> io::Result<Vec<Wid>> {
        let file = File::open(&self.path)?;
        let mut wids = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if let Some(wid) = parse_row(&line, index + 1) {
                wids.push(wid);
            }
        }
        Ok(wids)
    }
}

fn parse_row(line: &str, number: usize) -> Option<Wid> {
    if line.trim().is_empty() {
        return None;
    }
    let cells: Vec<&str> = line.split(';').map(str::trim).collect();
    match cells[0].to_ascii_uppercase().as_str() {
        "W" => parse_job_offset_row(&cells, number),
        "X" => parse_url_date_row(&cells, number),
        other => {
            debug!(
                "line {}: skipping row with unrecognized discriminator '{}'",
                number, other
            );
            None
        }
    }
}

fn parse_job_offset_row(cells: &[&str], number: usize) -> Option<Wid> {
    let job_id = match cells.get(1).and_then(|v| v.parse::<u64>().ok()) {
        Some(id) if id > 0 => id,
        _ => {
            warn!("line {}: job/offset row has no valid positive job id", number);
            return None;
        }
    };
    let file_offset = match cells.get(4).and_then(|v| v.parse::<u64>().ok()) {
        Some(offset) => offset,
        None => {
            warn!("line {}: job/offset row has no valid file offset", number);
            return None;
        }
    };
    Some(Wid::JobOffset {
        job_id,
        file_offset,
    })
}

fn parse_url_date_row(cells: &[&str], number: usize) -> Option<Wid> {
    let url = match cells.get(2) {
        Some(&url) if !url.is_empty() => url.to_owned(),
        _ => {
            warn!("line {}: url/date row has an empty URL", number);
            return None;
        }
    };
    let timestamp = match cells.get(3).and_then(|v| dates::parse_input_date(v)) {
        Some(timestamp) => timestamp,
        None => {
            warn!(
                "line {}: url/date row has no parseable capture date",
                number
            );
            return None;
        }
    };
    Some(Wid::UrlDate { url, timestamp })
}
