//! Tools for reading and writing CDX capture indexes and for writing WARC records.
//!
//! ## Background
//!
//! Web archives record each fetch of a resource (a *capture*) inside large
//! container files, most commonly in the WARC format standardized as ISO 28500.
//! Finding a capture again without scanning whole containers requires an index;
//! the de-facto standard is the CDX format, a line-oriented text file with one
//! line per capture listing the resource URL, the capture time, the response
//! digest and the location of the record inside its container. CDX files are
//! produced and consumed by most web-archiving toolchains, including the
//! Internet Archive's wayback machine and national-library harvest systems.
//!
//! ## CDX structure
//!
//! A CDX file consists of a format line describing the order of the fields,
//! followed by one space-separated line per capture. Field values that are
//! empty are written as a literal `-`. A small file might look like this:
//!
//! ```text
//! CDX a A b m s k r g V
//! http://example.org/ example.org/ 20120402235239 text/html 200 AAL2SABAJWFQ4DKTXRF3QPTWZ75TUHPC - 42-117-3.warc 1574
//! ```
//!
//! The field codes in the format line follow the classic CDX legend: `a` is
//! the original URL, `A` the normalized (canonicalized) URL, `b` the capture
//! date as a 14-digit UTC timestamp, `m` the content type, `s` the HTTP
//! status, `k` the content digest, `r` the redirect target, `g` the container
//! file name and `V` the byte offset of the record in that container.
//!
//! ## Library structure
//!
//! The [`cdx`] module holds the [`CdxEntry`](cdx::CdxEntry) record type, the
//! line codec driven by a [`CdxFormat`](cdx::CdxFormat) field-order
//! descriptor, and whole-file [`reader`](cdx::reader) and
//! [`writer`](cdx::writer) helpers. The [`warc`] module contains the subset
//! of WARC support this crate needs: building a record
//! [`Header`](warc::Header) and streaming its block through a
//! length-enforcing [`RecordWriter`](warc::RecordWriter), optionally gzip
//! compressed per record.

#[macro_use]
extern crate log;

pub mod cdx;
pub mod warc;

pub use cdx::{CdxEntry, CdxFormat, CdxParseError, CdxWriteError};
pub use warc::{Compression, Header, Version};
