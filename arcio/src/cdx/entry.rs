use chrono::{DateTime, Utc};

/// One record of a CDX capture index.
///
/// An entry describes a single capture: the resource address, when it was
/// fetched, what came back, and where the raw record lives inside its archive
/// container. Entries are produced by the CDX codec (parsing index files or
/// server responses) and are not modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdxEntry {
    /// The URL as it was requested during the harvest.
    pub url: String,
    /// The canonicalized form of the URL used as the index sort key.
    pub url_normalized: String,
    /// The instant of the capture, UTC.
    pub capture_time: DateTime<Utc>,
    /// Content type reported for the capture, if any.
    pub content_type: Option<String>,
    /// HTTP status of the captured response, if any.
    pub http_status: Option<u16>,
    /// Content digest, conventionally a base32-encoded SHA-1.
    pub digest: String,
    /// Redirect target when the capture was a redirect.
    pub redirect_url: Option<String>,
    /// Name of the archive container file holding the record.
    pub container_filename: String,
    /// Byte offset of the record inside the container file.
    pub file_offset: u64,
}

impl CdxEntry {
    /// The capture instant as milliseconds since the Unix epoch.
    ///
    /// Interval checks compare at this resolution.
    pub fn capture_time_millis(&self) -> i64 {
        self.capture_time.timestamp_millis()
    }
}
