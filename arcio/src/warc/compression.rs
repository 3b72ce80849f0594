//! Handling of record compression.
//!
//! WARC records are compressed individually rather than as a whole file, so
//! that a record can be accessed given only its byte offset without
//! decompressing every preceding record in the container.

use std::io::{Result as IoResult, Write};

use flate2::write::GzEncoder;

/// The supported methods of compressing a single record.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Compression {
    /// Uncompressed data.
    None,
    /// Per-record `gzip` compression.
    Gzip,
}

impl Compression {
    /// The conventional file extension for WARC files in this mode.
    pub fn file_extension(self) -> &'static str {
        match self {
            Compression::None => "warc",
            Compression::Gzip => "warc.gz",
        }
    }
}

/// Writes to an output stream with the specified [`Compression`].
pub(crate) enum Writer<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> Writer<W> {
    pub fn new(dest: W, mode: Compression) -> Self {
        match mode {
            Compression::None => Writer::Plain(dest),
            Compression::Gzip => {
                Writer::Gzip(GzEncoder::new(dest, flate2::Compression::best()))
            }
        }
    }

    /// Gracefully close the writer (terminating a compressed member) and
    /// return the output stream.
    pub fn finish(self) -> IoResult<W> {
        match self {
            Writer::Plain(w) => Ok(w),
            Writer::Gzip(gz) => gz.finish(),
        }
    }
}

impl<W: Write> Write for Writer<W> {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        match self {
            Writer::Plain(w) => w.write(buf),
            Writer::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> IoResult<()> {
        match self {
            Writer::Plain(w) => w.flush(),
            Writer::Gzip(w) => w.flush(),
        }
    }
}
