//! Tools for resolving web-archive identifiers into concrete capture records
//! and re-materializing the captured content.
//!
//! Archival researchers usually start from a spreadsheet: a list of URLs with
//! capture dates or date windows, exported as CSV. Turning those rows into
//! something usable means resolving each one against a CDX capture index,
//! optionally attaching metadata about the harvest job that produced the
//! capture, and sometimes pulling the raw archived bytes back out of their
//! containers. This crate implements that pipeline:
//!
//!  * [`wid`] and [`interval`] parse the two supported input CSV dialects
//!    into identifier records.
//!  * [`cdx`] resolves identifiers against a CDX service and applies the
//!    date-window filtering policy.
//!  * [`harvest`] derives harvest-job ids from container filenames and
//!    attaches job metadata, best effort.
//!  * [`metadata`] writes the combined result as a `;`-separated export.
//!  * [`packer`] fetches capture payloads from an archive repository and
//!    packages them into WARC files.
//!  * [`pipeline`] ties the metadata path together behind the
//!    `extract-metadata` binary; the `warc-extract` binary drives [`packer`]
//!    from an existing CDX file.
//!
//! Remote collaborators (the CDX server, the harvest-job service and the
//! archive repository) are modeled as capability traits with one production
//! HTTP implementation and one in-memory implementation each, so the
//! pipeline logic is testable without a network.

#[macro_use]
extern crate log;

use thiserror::Error;

pub mod cdx;
pub mod dates;
pub mod harvest;
pub mod interval;
pub mod metadata;
pub mod packer;
pub mod pipeline;
pub mod wid;

mod http;

pub use pipeline::{InputDialect, MetadataPipeline, OutputFormat, PipelineError};

/// An error talking to a remote collaborator.
///
/// Failures of this kind are recovered at the entry granularity: the caller
/// logs them and continues with the rest of the batch.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request could not be completed: transport failure, timeout, or an
    /// unexpected HTTP status.
    #[error("request to {url} failed: {reason}")]
    Http {
        /// The request URL.
        url: String,
        /// Short description of what went wrong.
        reason: String,
    },
    /// The collaborator does not know the requested resource.
    #[error("not found: {0}")]
    NotFound(String),
    /// The collaborator answered with something uninterpretable.
    #[error("malformed response from {url}: {reason}")]
    MalformedResponse {
        /// The request URL.
        url: String,
        /// Short description of the interpretation failure.
        reason: String,
    },
    /// An I/O error while reading a response body.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
