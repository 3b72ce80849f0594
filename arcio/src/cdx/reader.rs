//! Reading CDX files back into entries.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{CdxEntry, CdxFormat, CdxParseError};

/// Read all entries from the CDX file at `path`.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<CdxEntry>, CdxParseError> {
    let file = File::open(path)?;
    read_entries(BufReader::new(file))
}

/// Read CDX entries from line-oriented input.
///
/// If the first non-blank line is a format line it governs the rest of the
/// input; otherwise the canonical field order is assumed. Malformed data
/// lines are skipped with a logged diagnostic rather than failing the whole
/// input, but a malformed format line is an error since nothing after it
/// could be interpreted reliably.
pub fn read_entries<R: BufRead>(input: R) -> Result<Vec<CdxEntry>, CdxParseError> {
    let mut format: Option<CdxFormat> = None;
    let mut entries = Vec::new();

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if format.is_none() && CdxFormat::is_header_line(trimmed) {
            format = Some(CdxFormat::parse_header_line(trimmed)?);
            continue;
        }
        let format = format.get_or_insert_with(CdxFormat::canonical);
        match format.parse_line(trimmed) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!("skipping malformed CDX line {}: {}", number + 1, e),
        }
    }
    Ok(entries)
}
