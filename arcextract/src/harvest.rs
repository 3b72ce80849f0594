//! Harvest-job metadata and best-effort correlation.

use std::collections::HashMap;

use serde::Deserialize;
use url::Url;

use arcio::cdx::CdxEntry;

use crate::{http, SourceError};

/// Metadata for one harvest job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HarvestJobInfo {
    /// The job id.
    pub id: u64,
    /// The job type, e.g. `FOCUSED` or `SNAPSHOT`.
    #[serde(rename = "type")]
    pub job_type: String,
    /// The human-readable job name.
    pub name: String,
}

/// A service resolving job ids to harvest job metadata.
pub trait HarvestJobSource {
    /// Metadata for `job_id`, or None if the job is unknown.
    fn job_info(&self, job_id: u64) -> Result<Option<HarvestJobInfo>, SourceError>;
}

/// Production source: an HTTP service answering `GET {base}/{id}` with
/// `{"id": …, "type": …, "name": …}`.
pub struct HttpHarvestJobSource {
    base: Url,
}

impl HttpHarvestJobSource {
    pub fn new(base: &str) -> Result<Self, url::ParseError> {
        Ok(HttpHarvestJobSource {
            base: Url::parse(base)?,
        })
    }
}

impl HarvestJobSource for HttpHarvestJobSource {
    fn job_info(&self, job_id: u64) -> Result<Option<HarvestJobInfo>, SourceError> {
        let request_url = format!("{}/{}", self.base.as_str().trim_end_matches('/'), job_id);
        let response = match http::agent().get(&request_url).call() {
            Ok(response) => response,
            // An unknown job is an expected outcome, not a failure.
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(e) => {
                return Err(SourceError::Http {
                    reason: http::describe_error(&e),
                    url: request_url,
                });
            }
        };
        let info = serde_json::from_reader(response.into_reader()).map_err(|e| {
            SourceError::MalformedResponse {
                url: request_url,
                reason: e.to_string(),
            }
        })?;
        Ok(Some(info))
    }
}

/// In-memory source of canned job metadata, for tests and offline runs.
#[derive(Debug, Default)]
pub struct MemoryHarvestJobSource {
    jobs: HashMap<u64, HarvestJobInfo>,
}

impl MemoryHarvestJobSource {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&mut self, info: HarvestJobInfo) {
        self.jobs.insert(info.id, info);
    }
}

impl HarvestJobSource for MemoryHarvestJobSource {
    fn job_info(&self, job_id: u64) -> Result<Option<HarvestJobInfo>, SourceError> {
        Ok(self.jobs.get(&job_id).cloned())
    }
}

/// Derive the harvest job id embedded in a container filename.
///
/// The harvest system names containers with the producing job id as the
/// leading segment, delimited by `-` or `.`: in `1234-567-89.warc` the job
/// id is 1234. A filename that does not follow the convention yields None,
/// never an error.
pub fn extract_job_id(entry: &CdxEntry) -> Option<u64> {
    let segment = entry
        .container_filename
        .split(|c| c == '-' || c == '.')
        .next()?;
    segment.parse::<u64>().ok().filter(|&id| id > 0)
}

/// Attach harvest job metadata to an entry, best effort.
///
/// Yields None when no source is configured, no job id is derivable from the
/// container filename, the job is unknown, or the lookup fails. Failures are
/// logged at the entry level and never interrupt processing of other
/// entries.
pub fn correlate(
    entry: &CdxEntry,
    source: Option<&dyn HarvestJobSource>,
) -> Option<HarvestJobInfo> {
    let source = source?;
    let job_id = match extract_job_id(entry) {
        Some(id) => id,
        None => {
            debug!(
                "no job id derivable from container '{}'",
                entry.container_filename
            );
            return None;
        }
    };
    match source.job_info(job_id) {
        Ok(Some(info)) => Some(info),
        Ok(None) => {
            debug!("harvest job {} is unknown to the job service", job_id);
            None
        }
        Err(e) => {
            warn!("could not look up harvest job {}: {}", job_id, e);
            None
        }
    }
}
