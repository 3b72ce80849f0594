//! The `;`-separated metadata export format.

use std::borrow::Cow;
use std::io::{self, Write};

use arcio::cdx::{dates, CdxEntry};

use crate::harvest::HarvestJobInfo;

/// The fixed export header.
pub const HEADER: &str = "URL;Normalized URL;Date;Content type;HTTP Status;Checksum;\
Redirect URL;Filename;File offset;Job ID;Job Type;Job name";

/// Placeholder written in the job columns when no job info was resolved.
const NOT_AVAILABLE: &str = "N/A";

/// Writes the metadata export: one header line, then one row per
/// `(entry, job info)` pair in the order they are handed in — no reordering,
/// no deduplication.
pub struct MetadataWriter<W: Write> {
    out: W,
}

impl<W: Write> MetadataWriter<W> {
    /// Wrap an output stream, immediately writing the header line.
    pub fn new(mut out: W) -> io::Result<Self> {
        writeln!(out, "{}", HEADER)?;
        Ok(MetadataWriter { out })
    }

    /// Append one row.
    ///
    /// The date column uses the CDX date format regardless of what the input
    /// CSV used; absent optional values are written as empty fields, and
    /// absent job info as `N/A` in each of the three job columns.
    pub fn write_entry(
        &mut self,
        entry: &CdxEntry,
        job: Option<&HarvestJobInfo>,
    ) -> io::Result<()> {
        let status = entry
            .http_status
            .map(|status| status.to_string())
            .unwrap_or_default();
        let offset = entry.file_offset.to_string();

        let mut row: Vec<Cow<str>> = Vec::with_capacity(12);
        row.push(sanitize(&entry.url));
        row.push(sanitize(&entry.url_normalized));
        row.push(Cow::Owned(dates::format_wayback(&entry.capture_time)));
        row.push(sanitize(entry.content_type.as_deref().unwrap_or("")));
        row.push(Cow::Owned(status));
        row.push(sanitize(&entry.digest));
        row.push(sanitize(entry.redirect_url.as_deref().unwrap_or("")));
        row.push(sanitize(&entry.container_filename));
        row.push(Cow::Owned(offset));
        match job {
            Some(job) => {
                row.push(Cow::Owned(job.id.to_string()));
                row.push(sanitize(&job.job_type));
                row.push(sanitize(&job.name));
            }
            None => {
                for _ in 0..3 {
                    row.push(Cow::Borrowed(NOT_AVAILABLE));
                }
            }
        }

        writeln!(self.out, "{}", row.join(";"))
    }

    /// Flush and return the underlying stream.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Neutralize embedded column delimiters so every logical record stays
/// exactly one row.
fn sanitize(field: &str) -> Cow<str> {
    if field.contains(';') {
        Cow::Owned(field.replace(';', ","))
    } else {
        Cow::Borrowed(field)
    }
}
