//! Writing entries out as a CDX file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{CdxEntry, CdxFormat, CdxWriteError};

/// Writes a CDX file: one format line followed by one line per entry.
pub struct CdxFileWriter<W: Write> {
    out: W,
    format: CdxFormat,
}

impl CdxFileWriter<BufWriter<File>> {
    /// Create a CDX file at `path` and write the format line.
    ///
    /// Fails if the file cannot be created; an existing file is truncated,
    /// so callers that must not clobber output check for vacancy first.
    pub fn create<P: AsRef<Path>>(
        path: P,
        format: CdxFormat,
    ) -> Result<Self, CdxWriteError> {
        let file = File::create(path)?;
        CdxFileWriter::new(BufWriter::new(file), format)
    }
}

impl<W: Write> CdxFileWriter<W> {
    /// Wrap an output stream, immediately writing the format line.
    pub fn new(mut out: W, format: CdxFormat) -> Result<Self, CdxWriteError> {
        writeln!(out, "{}", format.header_line())?;
        Ok(CdxFileWriter { out, format })
    }

    /// Append one entry as a CDX line.
    pub fn write_entry(&mut self, entry: &CdxEntry) -> Result<(), CdxWriteError> {
        let line = self.format.format_line(entry)?;
        writeln!(self.out, "{}", line)?;
        Ok(())
    }

    /// Append every entry in order, returning the number written.
    pub fn write_entries<'a, I>(&mut self, entries: I) -> Result<usize, CdxWriteError>
    where
        I: IntoIterator<Item = &'a CdxEntry>,
    {
        let mut written = 0;
        for entry in entries {
            self.write_entry(entry)?;
            written += 1;
        }
        Ok(written)
    }

    /// Flush and return the underlying stream.
    pub fn finish(mut self) -> Result<W, CdxWriteError> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdx::dates;
    use pretty_assertions::assert_eq;

    fn sample_entry() -> CdxEntry {
        CdxEntry {
            url: "http://example.org/".into(),
            url_normalized: "example.org/".into(),
            capture_time: dates::parse_wayback("20120402235239").unwrap(),
            content_type: Some("text/html".into()),
            http_status: Some(200),
            digest: "DIGESTA".into(),
            redirect_url: None,
            container_filename: "42-117-3.warc".into(),
            file_offset: 1574,
        }
    }

    #[test]
    fn writes_format_line_then_entries() {
        let mut writer =
            CdxFileWriter::new(Vec::new(), CdxFormat::canonical()).unwrap();
        writer.write_entry(&sample_entry()).unwrap();
        let out = writer.finish().unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "CDX a A b m s k r g V\n\
             http://example.org/ example.org/ 20120402235239 text/html 200 DIGESTA - 42-117-3.warc 1574\n"
        );
    }

    #[test]
    fn write_entries_reports_count() {
        let mut writer =
            CdxFileWriter::new(Vec::new(), CdxFormat::canonical()).unwrap();
        let entries = vec![sample_entry(), sample_entry()];
        assert_eq!(writer.write_entries(&entries).unwrap(), 2);
    }

    #[test]
    fn incomplete_entry_fails_the_write() {
        let mut entry = sample_entry();
        entry.container_filename = String::new();
        let mut writer =
            CdxFileWriter::new(Vec::new(), CdxFormat::canonical()).unwrap();
        assert!(writer.write_entry(&entry).is_err());
    }
}
