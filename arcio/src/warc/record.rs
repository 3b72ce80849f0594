//! Streaming a record block to an output.

use std::cmp;
use std::io::{self, Write};

use super::compression;
use super::{Compression, Header};

/// Writes the block of a single WARC record.
///
/// Created by [`Header::write_to`], which serializes the header first. The
/// writer accepts at most `Content-Length` bytes of block data; writes past
/// that limit are discarded (returning 0 bytes written). Call
/// [`finish`](Self::finish) to emit the record tail (CRLF CRLF) and close
/// the compressed member when writing gzip records; finishing fails if fewer
/// than `Content-Length` bytes were written, since a short block would
/// corrupt the container.
pub struct RecordWriter<W: Write> {
    out: Option<compression::Writer<W>>,
    limit: u64,
    written: u64,
}

impl<W: Write> RecordWriter<W> {
    pub(crate) fn new(
        dest: W,
        header: &Header,
        compression: Compression,
    ) -> io::Result<Self> {
        let limit = header.content_length().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "record header does not declare a valid Content-Length",
            )
        })?;

        let mut out = compression::Writer::new(dest, compression);
        header.serialize(&mut out)?;
        Ok(RecordWriter {
            out: Some(out),
            limit,
            written: 0,
        })
    }

    /// Terminate the record and return the underlying output stream.
    pub fn finish(mut self) -> io::Result<W> {
        if self.written != self.limit {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!(
                    "record block wrote {} bytes but Content-Length is {}",
                    self.written, self.limit
                ),
            ));
        }
        let mut out = self.out.take().expect("record already finished");
        // A record is always followed by CRLF2
        out.write_all(b"\r\n\r\n")?;
        out.finish()
    }
}

impl<W: Write> Write for RecordWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        debug_assert!(self.written <= self.limit);
        let take = cmp::min(buf.len() as u64, self.limit - self.written) as usize;

        let out = match self.out.as_mut() {
            Some(out) => out,
            None => return Ok(0),
        };
        let written = out.write(&buf[..take])?;
        self.written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.out.as_mut() {
            Some(out) => out.flush(),
            None => Ok(()),
        }
    }
}

impl<W: Write> Drop for RecordWriter<W> {
    fn drop(&mut self) {
        if self.out.is_some() {
            error!(
                "record writer dropped before finish() with {} of {} block bytes written",
                self.written, self.limit
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warc::{FieldKind, Version};
    use pretty_assertions::assert_eq;
    use std::io::Read;

    fn header_with_length(len: usize) -> Header {
        let mut header = Header::new(Version::WARC1_1);
        header.set_field(FieldKind::Type, "resource");
        header.set_field(FieldKind::ContentLength, len.to_string());
        header
    }

    #[test]
    fn short_block_fails_finish() {
        let header = header_with_length(10);
        let mut body = header.write_to(Vec::new(), Compression::None).unwrap();
        body.write_all(b"7 bytes").unwrap();
        assert!(body.finish().is_err());
    }

    #[test]
    fn gzip_record_decodes_to_plain_form() {
        let header = header_with_length(4);
        let mut body = header.write_to(Vec::new(), Compression::Gzip).unwrap();
        body.write_all(b"data").unwrap();
        let compressed = body.finish().unwrap();

        let mut decoded = Vec::new();
        flate2::read::GzDecoder::new(&compressed[..])
            .read_to_end(&mut decoded)
            .unwrap();

        let mut plain_body = header_with_length(4)
            .write_to(Vec::new(), Compression::None)
            .unwrap();
        plain_body.write_all(b"data").unwrap();
        let plain = plain_body.finish().unwrap();

        assert_eq!(decoded, plain);
    }

    #[test]
    fn excess_block_data_is_discarded() {
        let header = header_with_length(2);
        let mut body = header.write_to(Vec::new(), Compression::None).unwrap();
        assert_eq!(body.write(b"abcd").unwrap(), 2);
        assert_eq!(body.write(b"cd").unwrap(), 0);
        let out = body.finish().unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("ab\r\n\r\n"));
    }
}
