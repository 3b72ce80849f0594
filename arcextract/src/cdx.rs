//! Querying a CDX service and resolving identifiers against it.

use std::collections::HashMap;

use url::Url;

use arcio::cdx::{CdxEntry, CdxFormat};

use crate::interval::UrlInterval;
use crate::wid::Wid;
use crate::{http, SourceError};

/// A CDX index queryable by URL.
///
/// The source returns raw index lines and nothing else; parsing and the
/// date-window filtering policy live in [`CdxExtractor`], client side,
/// because the index's native query granularity is coarser than the window
/// semantics this tool needs. That also keeps the policy testable without a
/// server.
pub trait CdxSource {
    /// All raw index lines for captures of `url`, zero or more.
    fn query(&self, url: &str) -> Result<Vec<String>, SourceError>;
}

/// Production source: HTTP queries against a CDX server.
pub struct HttpCdxSource {
    base: Url,
}

impl HttpCdxSource {
    /// The base URL is validated here; queries append `?url=<encoded>`.
    pub fn new(base: &str) -> Result<Self, url::ParseError> {
        Ok(HttpCdxSource {
            base: Url::parse(base)?,
        })
    }
}

impl CdxSource for HttpCdxSource {
    fn query(&self, url: &str) -> Result<Vec<String>, SourceError> {
        let request_url = format!("{}?url={}", self.base, urlencoding::encode(url));
        let response = match http::agent().get(&request_url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => {
                return Err(SourceError::NotFound(url.to_owned()));
            }
            Err(e) => {
                return Err(SourceError::Http {
                    reason: http::describe_error(&e),
                    url: request_url,
                });
            }
        };
        let body = response.into_string()?;
        Ok(body.lines().map(str::to_owned).collect())
    }
}

/// In-memory source serving canned lines, for tests and offline runs.
#[derive(Debug, Default)]
pub struct MemoryCdxSource {
    lines: HashMap<String, Vec<String>>,
}

impl MemoryCdxSource {
    pub fn new() -> Self {
        Default::default()
    }

    /// Register the index lines returned for captures of `url`.
    pub fn insert_lines<I>(&mut self, url: &str, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.lines
            .entry(url.to_owned())
            .or_default()
            .extend(lines);
    }
}

impl CdxSource for MemoryCdxSource {
    fn query(&self, url: &str) -> Result<Vec<String>, SourceError> {
        Ok(self.lines.get(url).cloned().unwrap_or_default())
    }
}

/// Resolves identifiers and intervals to capture entries through a
/// [`CdxSource`].
pub struct CdxExtractor<S> {
    source: S,
}

impl<S: CdxSource> CdxExtractor<S> {
    pub fn new(source: S) -> Self {
        CdxExtractor { source }
    }

    /// Resolve each identifier to at most one entry, preserving input order.
    ///
    /// URL/date identifiers match the capture whose time equals the
    /// identifier's timestamp at seconds resolution (the resolution of both
    /// the input format and the index). Job/offset identifiers name a
    /// container position, which a URL-keyed index cannot answer; they are
    /// omitted with a warning. Unresolved identifiers and per-identifier
    /// source failures likewise contribute nothing — never an abort.
    pub fn retrieve_for_wids(&self, wids: &[Wid]) -> Vec<CdxEntry> {
        let mut entries = Vec::new();
        for wid in wids {
            match wid {
                Wid::UrlDate { url, timestamp } => {
                    let matched = self
                        .query_entries(url)
                        .into_iter()
                        .find(|e| e.capture_time.timestamp() == timestamp.timestamp());
                    match matched {
                        Some(entry) => entries.push(entry),
                        None => {
                            warn!("no CDX entry for '{}' captured at {}", url, timestamp)
                        }
                    }
                }
                Wid::JobOffset {
                    job_id,
                    file_offset,
                } => {
                    warn!(
                        "cannot resolve the capture at offset {} of job {} through a URL-keyed CDX index",
                        file_offset, job_id
                    );
                }
            }
        }
        entries
    }

    /// All captures of the interval's URL whose time falls inside the window.
    pub fn retrieve_for_interval(&self, interval: &UrlInterval) -> Vec<CdxEntry> {
        self.query_entries(interval.url())
            .into_iter()
            .filter(|e| interval.contains(e.capture_time))
            .collect()
    }

    /// Query one URL and parse the response, recovering from failures with
    /// zero results.
    fn query_entries(&self, url: &str) -> Vec<CdxEntry> {
        let lines = match self.source.query(url) {
            Ok(lines) => lines,
            Err(e) => {
                warn!("CDX lookup for '{}' failed: {}", url, e);
                return Vec::new();
            }
        };

        let mut format = CdxFormat::canonical();
        let mut entries = Vec::new();
        for line in &lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if CdxFormat::is_header_line(trimmed) {
                match CdxFormat::parse_header_line(trimmed) {
                    Ok(parsed) => format = parsed,
                    Err(e) => warn!("ignoring malformed CDX format line: {}", e),
                }
                continue;
            }
            match format.parse_line(trimmed) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("skipping malformed CDX line for '{}': {}", url, e),
            }
        }
        entries
    }
}
