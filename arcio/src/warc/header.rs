//! WARC record header construction.

use std::io::{self, Write};

use indexmap::IndexMap;

use super::record::RecordWriter;
use super::{Compression, Version};

/// The record types this crate writes.
///
/// The WARC specification defines further types (`request`, `revisit`,
/// `conversion`, `continuation`); they are omitted here because no operation
/// produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `warcinfo`: describes the records that follow, through the end of the
    /// file or until the next info record. Conventionally the first record
    /// of every WARC file, with a `application/warc-fields` block naming the
    /// software that wrote the file.
    Info,
    /// `response`: a complete scheme-specific response, for http(s) a full
    /// HTTP response including headers as it appeared on the network.
    Response,
    /// `resource`: a resource without protocol response information.
    Resource,
    /// `metadata`: content that further describes another record.
    Metadata,
}

impl RecordKind {
    /// The field value written for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Info => "warcinfo",
            RecordKind::Response => "response",
            RecordKind::Resource => "resource",
            RecordKind::Metadata => "metadata",
        }
    }
}

/// The header field names this crate writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `WARC-Type`: the record type. Mandatory.
    Type,
    /// `WARC-Record-ID`: a globally unique identifier for the record,
    /// conventionally an RFC 4122 UUID URN in angle brackets. Mandatory.
    RecordId,
    /// `WARC-Date`: the capture instant as a UTC W3C/ISO 8601 timestamp.
    /// Mandatory.
    Date,
    /// `Content-Length`: the number of bytes in the record block. Mandatory.
    ContentLength,
    /// `Content-Type`: the MIME type of the record block.
    ContentType,
    /// `WARC-Target-URI`: the URI the capture refers to.
    TargetUri,
    /// `WARC-Filename`: on a `warcinfo` record, the name of the containing
    /// file.
    Filename,
    /// `WARC-Payload-Digest`: a `labelled-digest` of the record payload,
    /// e.g. `sha1:3EF4GH5IJ6KL7MN8OPQAB2CD`.
    PayloadDigest,
    /// `WARC-Block-Digest`: a `labelled-digest` of the complete record
    /// block, in the same format as the payload digest.
    BlockDigest,
    /// `WARC-Identified-Payload-Type`: the independently determined MIME
    /// type of the payload.
    IdentifiedPayloadType,
}

impl FieldKind {
    /// The canonical spelling of this field name.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Type => "WARC-Type",
            FieldKind::RecordId => "WARC-Record-ID",
            FieldKind::Date => "WARC-Date",
            FieldKind::ContentLength => "Content-Length",
            FieldKind::ContentType => "Content-Type",
            FieldKind::TargetUri => "WARC-Target-URI",
            FieldKind::Filename => "WARC-Filename",
            FieldKind::PayloadDigest => "WARC-Payload-Digest",
            FieldKind::BlockDigest => "WARC-Block-Digest",
            FieldKind::IdentifiedPayloadType => "WARC-Identified-Payload-Type",
        }
    }
}

impl AsRef<str> for FieldKind {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// The header of a WARC record being written.
///
/// Fields are kept in insertion order and serialized exactly as set. A header
/// can emit its record by calling [`write_to`](Self::write_to), which yields
/// a [`RecordWriter`] accepting exactly `Content-Length` bytes of block data.
///
/// ```
/// # use arcio::warc::{Compression, FieldKind, Header, RecordKind, Version};
/// # use std::io::Write;
/// let mut header = Header::new(Version::WARC1_1);
/// header.set_field(FieldKind::Type, RecordKind::Resource.as_str());
/// header.set_field(FieldKind::ContentLength, "5");
/// let mut body = header.write_to(Vec::new(), Compression::None).unwrap();
/// body.write_all(b"hello").unwrap();
/// let out = body.finish().unwrap();
/// assert!(out.starts_with(b"WARC/1.1\r\n"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    version: Version,
    fields: IndexMap<FieldKind, String>,
}

impl Header {
    pub fn new(version: Version) -> Self {
        Header {
            version,
            fields: IndexMap::new(),
        }
    }

    /// Set the value of a header field, returning the old value (if any).
    pub fn set_field<V: Into<String>>(
        &mut self,
        name: FieldKind,
        value: V,
    ) -> Option<String> {
        self.fields.insert(name, value.into())
    }

    /// Get the value of a header field, or None if it has not been set.
    pub fn get_field(&self, name: FieldKind) -> Option<&str> {
        self.fields.get(&name).map(String::as_str)
    }

    /// The declared `Content-Length`, if present and a valid integer.
    pub fn content_length(&self) -> Option<u64> {
        self.get_field(FieldKind::ContentLength)?.parse().ok()
    }

    /// The WARC version of this record.
    pub fn version(&self) -> &Version {
        &self.version
    }

    pub(crate) fn serialize<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}\r\n", self.version)?;
        for (name, value) in &self.fields {
            write!(out, "{}: {}\r\n", name.as_str(), value)?;
        }
        out.write_all(b"\r\n")
    }

    /// Begin writing this record to the given output stream.
    ///
    /// The returned writer accepts exactly as many block bytes as the
    /// [`Content-Length`](FieldKind::ContentLength) field declares; a header
    /// without a valid `Content-Length` is rejected here, before anything is
    /// written, since the WARC format cannot represent a record of unknown
    /// length.
    pub fn write_to<W: Write>(
        &self,
        dest: W,
        compression: Compression,
    ) -> io::Result<RecordWriter<W>> {
        RecordWriter::new(dest, self, compression)
    }
}
