//! The CDX capture-index format: record model, line codec and file I/O.

use thiserror::Error;

pub mod dates;
mod entry;
mod format;
pub mod reader;
pub mod writer;

pub use entry::CdxEntry;
pub use format::{CdxField, CdxFormat};
pub use writer::CdxFileWriter;

/// Reasons a CDX line or format line cannot be parsed.
#[derive(Debug, Error)]
pub enum CdxParseError {
    /// The format line does not start with the `CDX` magic.
    ///
    /// The contained value is the beginning of the line that was attempted to
    /// be parsed.
    #[error("CDX format line missing or invalid (near \"{0}\")")]
    InvalidFormatLine(String),
    /// The format line names a field code that is not in the CDX legend.
    #[error("unknown CDX field code '{0}'")]
    UnknownFieldCode(char),
    /// A data line does not have one value per field of the format.
    #[error("expected {expected} CDX fields but found {found}")]
    FieldCountMismatch {
        /// Number of fields in the governing format.
        expected: usize,
        /// Number of values found on the line.
        found: usize,
    },
    /// A field the record model requires was empty (`-`) or not supplied
    /// by the format.
    #[error("required CDX field '{0}' is empty")]
    MissingField(&'static str),
    /// A field value could not be interpreted (bad date, non-numeric offset
    /// or status).
    #[error("CDX field '{field}' has malformed value \"{value}\"")]
    MalformedField {
        /// Name of the offending field.
        field: &'static str,
        /// The raw value as found on the line.
        value: String,
    },
    /// An I/O error occurred while reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons an entry cannot be serialized to a CDX line.
///
/// The CDX format has no concept of a partially-populated line, so writing
/// fails fast rather than emitting a malformed record.
#[derive(Debug, Error)]
pub enum CdxWriteError {
    /// A required field holds an empty value.
    #[error("required CDX field '{0}' is empty")]
    MissingField(&'static str),
    /// An I/O error occurred while writing the output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
