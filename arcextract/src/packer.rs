//! Materializing CDX entries into WARC files.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use data_encoding::BASE32;
use indexmap::IndexMap;
use sha1::{Digest, Sha1};
use url::Url;
use uuid::Uuid;

use arcio::cdx::{dates, CdxEntry};
use arcio::warc::{Compression, FieldKind, Header, RecordKind, Version};

use crate::{http, SourceError};

/// A store of archive containers addressable by `(filename, offset)`.
pub trait ArchiveStore {
    /// The raw record payload at `offset` of container `filename`.
    fn fetch(&self, filename: &str, offset: u64) -> Result<Vec<u8>, SourceError>;
}

/// Production store: ranged HTTP reads against an archive repository.
///
/// Containers ending in `.gz` hold individually compressed records, so the
/// ranged response is decoded as a single gzip member — exactly the record
/// starting at the requested offset. Plain containers return the raw range
/// body.
pub struct HttpArchiveStore {
    base: Url,
}

impl HttpArchiveStore {
    pub fn new(base: &str) -> Result<Self, url::ParseError> {
        Ok(HttpArchiveStore {
            base: Url::parse(base)?,
        })
    }
}

impl ArchiveStore for HttpArchiveStore {
    fn fetch(&self, filename: &str, offset: u64) -> Result<Vec<u8>, SourceError> {
        let request_url = format!("{}/{}", self.base.as_str().trim_end_matches('/'), filename);
        let response = match http::agent()
            .get(&request_url)
            .set("Range", &format!("bytes={}-", offset))
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => {
                return Err(SourceError::NotFound(format!(
                    "{} (offset {})",
                    filename, offset
                )));
            }
            Err(e) => {
                return Err(SourceError::Http {
                    reason: http::describe_error(&e),
                    url: request_url,
                });
            }
        };

        let mut payload = Vec::new();
        let mut reader = response.into_reader();
        if filename.ends_with(".gz") {
            flate2::read::GzDecoder::new(reader).read_to_end(&mut payload)?;
        } else {
            reader.read_to_end(&mut payload)?;
        }
        Ok(payload)
    }
}

/// In-memory store of canned payloads, for tests and offline runs.
#[derive(Debug, Default)]
pub struct MemoryArchiveStore {
    blobs: HashMap<(String, u64), Vec<u8>>,
}

impl MemoryArchiveStore {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&mut self, filename: &str, offset: u64, payload: Vec<u8>) {
        self.blobs.insert((filename.to_owned(), offset), payload);
    }
}

impl ArchiveStore for MemoryArchiveStore {
    fn fetch(&self, filename: &str, offset: u64) -> Result<Vec<u8>, SourceError> {
        self.blobs
            .get(&(filename.to_owned(), offset))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("{} (offset {})", filename, offset)))
    }
}

/// What a packing pass produced.
#[derive(Debug)]
pub struct PackSummary {
    /// The WARC files actually written.
    pub files: Vec<PathBuf>,
    /// Number of captures packaged into records.
    pub packed: usize,
    /// Number of captures skipped because their payload could not be fetched.
    pub skipped: usize,
}

/// Packages captures into WARC files.
///
/// Entries are grouped by source container and every group becomes one
/// output file, so a record is never split across files and records keep
/// the locality they had in the archive. Each output file opens with a
/// `warcinfo` record followed by one `response` record per capture.
pub struct WarcPacker<A> {
    store: A,
    compression: Compression,
}

impl<A: ArchiveStore> WarcPacker<A> {
    pub fn new(store: A) -> Self {
        WarcPacker::with_compression(store, Compression::None)
    }

    pub fn with_compression(store: A, compression: Compression) -> Self {
        WarcPacker { store, compression }
    }

    /// Fetch every entry's payload and write the WARC files into `out_dir`.
    ///
    /// A fetch failure skips that entry with a logged warning; the summary
    /// reports how many captures were packed and skipped and which files
    /// were produced (a container none of whose fetches succeeded produces
    /// no file). Only output I/O failures abort the pass.
    pub fn pack(&self, entries: &[CdxEntry], out_dir: &Path) -> io::Result<PackSummary> {
        fs::create_dir_all(out_dir)?;

        let mut groups: IndexMap<&str, Vec<&CdxEntry>> = IndexMap::new();
        for entry in entries {
            groups
                .entry(entry.container_filename.as_str())
                .or_default()
                .push(entry);
        }

        let mut summary = PackSummary {
            files: Vec::new(),
            packed: 0,
            skipped: 0,
        };
        for (container, group) in groups {
            let path = out_dir.join(self.output_name(container));
            let mut writer: Option<BufWriter<File>> = None;

            for entry in group {
                let payload = match self.store.fetch(&entry.container_filename, entry.file_offset)
                {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(
                            "skipping capture of '{}' at {} offset {}: {}",
                            entry.url, entry.container_filename, entry.file_offset, e
                        );
                        summary.skipped += 1;
                        continue;
                    }
                };

                if writer.is_none() {
                    let mut file = BufWriter::new(File::create(&path)?);
                    self.write_warcinfo(&mut file, &path)?;
                    writer = Some(file);
                }
                if let Some(out) = writer.as_mut() {
                    self.write_response(out, entry, &payload)?;
                    summary.packed += 1;
                }
            }

            if let Some(mut out) = writer {
                out.flush()?;
                summary.files.push(path);
            }
        }
        Ok(summary)
    }

    fn output_name(&self, container: &str) -> String {
        let base = container.trim_end_matches(".gz");
        let base = base.trim_end_matches(".warc").trim_end_matches(".arc");
        format!("{}.{}", base, self.compression.file_extension())
    }

    fn write_warcinfo<W: Write>(&self, out: &mut W, path: &Path) -> io::Result<()> {
        let body = format!(
            "software: arcextract/{}\r\nformat: WARC File Format 1.1\r\n",
            env!("CARGO_PKG_VERSION")
        );

        let mut header = Header::new(Version::WARC1_1);
        header.set_field(FieldKind::Type, RecordKind::Info.as_str());
        header.set_field(FieldKind::RecordId, new_record_id());
        header.set_field(FieldKind::Date, dates::format_warc(&Utc::now()));
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            header.set_field(FieldKind::Filename, name);
        }
        header.set_field(FieldKind::ContentType, "application/warc-fields");
        header.set_field(FieldKind::ContentLength, body.len().to_string());

        let mut record = header.write_to(&mut *out, self.compression)?;
        record.write_all(body.as_bytes())?;
        record.finish()?;
        Ok(())
    }

    fn write_response<W: Write>(
        &self,
        out: &mut W,
        entry: &CdxEntry,
        payload: &[u8],
    ) -> io::Result<()> {
        let mut header = Header::new(Version::WARC1_1);
        header.set_field(FieldKind::Type, RecordKind::Response.as_str());
        header.set_field(FieldKind::RecordId, new_record_id());
        header.set_field(FieldKind::Date, dates::format_warc(&entry.capture_time));
        header.set_field(FieldKind::TargetUri, entry.url.as_str());
        header.set_field(FieldKind::ContentType, "application/http;msgtype=response");
        header.set_field(FieldKind::PayloadDigest, labelled_digest(&entry.digest));
        header.set_field(FieldKind::BlockDigest, block_digest(payload));
        if let Some(content_type) = &entry.content_type {
            header.set_field(FieldKind::IdentifiedPayloadType, content_type.as_str());
        }
        header.set_field(FieldKind::ContentLength, payload.len().to_string());

        let mut record = header.write_to(&mut *out, self.compression)?;
        record.write_all(payload)?;
        record.finish()?;
        Ok(())
    }
}

fn new_record_id() -> String {
    format!("<urn:uuid:{}>", Uuid::new_v4())
}

/// CDX checksums are conventionally bare base32 SHA-1 values; label them as
/// WARC 1.1 §5.8 `labelled-digest`s unless the index already carried a label.
fn labelled_digest(digest: &str) -> String {
    if digest.contains(':') {
        digest.to_owned()
    } else {
        format!("sha1:{}", digest)
    }
}

fn block_digest(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    format!("sha1:{}", BASE32.encode(hasher.finalize().as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(url: &str, container: &str, offset: u64) -> CdxEntry {
        CdxEntry {
            url: url.into(),
            url_normalized: url.trim_start_matches("http://").into(),
            capture_time: dates::parse_wayback("20120402235239").unwrap(),
            content_type: Some("text/html".into()),
            http_status: Some(200),
            digest: "AAL2SABAJWFQ4DKTXRF3QPTWZ75TUHPC".into(),
            redirect_url: None,
            container_filename: container.into(),
            file_offset: offset,
        }
    }

    #[test]
    fn output_files_are_named_for_their_container() {
        let packer = WarcPacker::new(MemoryArchiveStore::new());
        assert_eq!(packer.output_name("42-117-3.warc"), "42-117-3.warc");
        assert_eq!(packer.output_name("42-117-3.warc.gz"), "42-117-3.warc");
        assert_eq!(packer.output_name("42-117-3.arc"), "42-117-3.warc");

        let gz_packer =
            WarcPacker::with_compression(MemoryArchiveStore::new(), Compression::Gzip);
        assert_eq!(gz_packer.output_name("42-117-3.warc"), "42-117-3.warc.gz");
    }

    #[test]
    fn groups_entries_into_one_file_per_container() {
        let mut store = MemoryArchiveStore::new();
        store.insert("1-1-1.warc", 0, b"HTTP/1.1 200 OK\r\n\r\na".to_vec());
        store.insert("1-1-1.warc", 512, b"HTTP/1.1 200 OK\r\n\r\nb".to_vec());
        store.insert("2-1-1.warc", 0, b"HTTP/1.1 200 OK\r\n\r\nc".to_vec());

        let entries = vec![
            entry("http://example.org/a", "1-1-1.warc", 0),
            entry("http://example.org/c", "2-1-1.warc", 0),
            entry("http://example.org/b", "1-1-1.warc", 512),
        ];

        let dir = tempfile::tempdir().unwrap();
        let summary = WarcPacker::new(store).pack(&entries, dir.path()).unwrap();

        assert_eq!(summary.packed, 3);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.files.len(), 2);
        assert!(dir.path().join("1-1-1.warc").is_file());
        assert!(dir.path().join("2-1-1.warc").is_file());
    }

    #[test]
    fn each_file_opens_with_a_warcinfo_record() {
        let mut store = MemoryArchiveStore::new();
        store.insert("1-1-1.warc", 0, b"HTTP/1.1 200 OK\r\n\r\nhello".to_vec());

        let dir = tempfile::tempdir().unwrap();
        WarcPacker::new(store)
            .pack(&[entry("http://example.org/", "1-1-1.warc", 0)], dir.path())
            .unwrap();

        let bytes = fs::read(dir.path().join("1-1-1.warc")).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("WARC/1.1\r\nWARC-Type: warcinfo\r\n"));
        assert!(text.contains("WARC-Type: response"));
        assert!(text.contains("WARC-Target-URI: http://example.org/"));
        assert!(text.contains("WARC-Payload-Digest: sha1:AAL2SABAJWFQ4DKTXRF3QPTWZ75TUHPC"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn fetch_failures_skip_only_that_capture() {
        let mut store = MemoryArchiveStore::new();
        store.insert("1-1-1.warc", 0, b"a".to_vec());
        store.insert("1-1-1.warc", 1024, b"c".to_vec());
        // No payload for offset 512

        let entries = vec![
            entry("http://example.org/a", "1-1-1.warc", 0),
            entry("http://example.org/b", "1-1-1.warc", 512),
            entry("http://example.org/c", "1-1-1.warc", 1024),
        ];

        let dir = tempfile::tempdir().unwrap();
        let summary = WarcPacker::new(store).pack(&entries, dir.path()).unwrap();

        assert_eq!(summary.packed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.files.len(), 1);
    }

    #[test]
    fn a_container_with_no_fetchable_captures_produces_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let summary = WarcPacker::new(MemoryArchiveStore::new())
            .pack(&[entry("http://example.org/", "1-1-1.warc", 0)], dir.path())
            .unwrap();

        assert_eq!(summary.packed, 0);
        assert_eq!(summary.skipped, 1);
        assert!(summary.files.is_empty());
        assert!(!dir.path().join("1-1-1.warc").exists());
    }
}
