//! Conditional retrieval of the remote forecast bundle.
//!
//! One fetch is one GET. Unchanged upstream content is detected twice over:
//! an `If-Modified-Since` conditional request (server-side short circuit) and
//! a SHA-256 fingerprint of the downloaded payload (covers servers that
//! ignore conditional headers). Either way the caller gets `Unchanged` and
//! skips the parse. Retrying is the scheduler's business, never ours.

use std::io::{Cursor, Read};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, IF_MODIFIED_SINCE, LAST_MODIFIED, USER_AGENT};
use reqwest::StatusCode;
use tracing::debug;

use crate::domain::Fingerprint;
use crate::error::FetchError;

/// Decompressed forecast document plus the identity of the payload it came from.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub kml: String,
    pub fingerprint: Fingerprint,
}

#[derive(Debug)]
pub enum FetchOutcome {
    /// Upstream published something we have not seen yet.
    New(RawDocument),
    /// Upstream content is identical to the previous fetch.
    Unchanged,
}

pub struct FeedFetcher {
    client: reqwest::Client,
    url: String,
    last_modified: Option<String>,
    last_fingerprint: Option<Fingerprint>,
}

impl FeedFetcher {
    pub fn new(url: String) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("pvcast/0.1"));
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            url,
            last_modified: None,
            last_fingerprint: None,
        })
    }

    /// Fetch the bundle once. Network I/O only; no shared state is touched.
    pub async fn fetch(&mut self) -> Result<FetchOutcome, FetchError> {
        let mut request = self.client.get(&self.url);
        if let Some(since) = &self.last_modified {
            request = request.header(IF_MODIFIED_SINCE, since);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::NOT_MODIFIED {
            debug!(url = %self.url, "feed not modified since last fetch");
            return Ok(FetchOutcome::Unchanged);
        }
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response.bytes().await?;
        let fingerprint = Fingerprint::of_bytes(&body);

        if self.last_fingerprint.as_ref() == Some(&fingerprint) {
            debug!(%fingerprint, "feed content identical to previous fetch");
            self.last_modified = last_modified;
            return Ok(FetchOutcome::Unchanged);
        }

        let kml = unpack(&body)?;

        self.last_modified = last_modified;
        self.last_fingerprint = Some(fingerprint.clone());

        Ok(FetchOutcome::New(RawDocument { kml, fingerprint }))
    }
}

/// KMZ bundles are zip archives holding a single KML entry; some mirrors
/// serve the KML uncompressed.
fn unpack(body: &[u8]) -> Result<String, FetchError> {
    if body.starts_with(b"PK") {
        let mut archive = zip::ZipArchive::new(Cursor::new(body))?;
        if archive.is_empty() {
            return Err(FetchError::EmptyArchive);
        }
        let mut entry = archive.by_index(0)?;
        let mut kml = String::new();
        entry.read_to_string(&mut kml)?;
        Ok(kml)
    } else {
        Ok(String::from_utf8(body.to_vec())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kmz(content: &str) -> Vec<u8> {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let mut buffer = Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file("forecast.kml", options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
        writer.finish().unwrap();
        buffer.into_inner()
    }

    #[test]
    fn unpack_reads_first_archive_entry() {
        let body = kmz("<kml>hello</kml>");
        assert_eq!(unpack(&body).unwrap(), "<kml>hello</kml>");
    }

    #[test]
    fn unpack_passes_plain_documents_through() {
        assert_eq!(unpack(b"<kml>plain</kml>").unwrap(), "<kml>plain</kml>");
    }

    #[test]
    fn unpack_rejects_truncated_archives() {
        // Valid zip magic, garbage after.
        let body = b"PK\x03\x04garbage";
        assert!(unpack(body).is_err());
    }
}
