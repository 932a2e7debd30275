//! Document acquisition: URL to file on disk to descriptor
//!
//! The filesystem doubles as a fetch cache keyed by filename: a file
//! that already exists under the target name is treated as already
//! fetched and described without a network call, using its modification
//! time as the download timestamp. A name collision between different
//! files is indistinguishable here; content identity catches it later
//! at indexing time.

use crate::crawler::fetcher::{fetch_bytes, FetchError, RetryPolicy};
use crate::identity;
use crate::manifest::{DocStatus, DocumentRecord};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use url::Url;

/// Name used when the URL path has no usable last segment
const FALLBACK_FILENAME: &str = "document.pdf";

/// Derives the target filename from the URL's last path segment
pub fn filename_for(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}

/// Downloads a document into `dir`, or describes the already-present
/// file of the same name
///
/// Returns `None` on any fetch or write failure; the candidate link is
/// dropped and the crawl continues.
pub async fn acquire(
    client: &Client,
    url: &Url,
    source_page: &Url,
    dir: &Path,
    policy: &RetryPolicy,
    timeout: Duration,
) -> Option<DocumentRecord> {
    let name = filename_for(url);
    let path = dir.join(&name);

    if path.exists() {
        tracing::debug!("{} already on disk, skipping download", name);
        return match describe_existing(&path, &name, url, source_page) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Failed to describe existing file {}: {}", path.display(), e);
                None
            }
        };
    }

    let bytes = match fetch_bytes(client, url, policy, timeout).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log_fetch_failure(url, &e);
            return None;
        }
    };

    if let Err(e) = write_atomic(&path, &bytes) {
        tracing::warn!("Failed to write {}: {}", path.display(), e);
        return None;
    }
    tracing::info!("Downloaded {} ({} bytes)", name, bytes.len());

    Some(DocumentRecord {
        id: identity::content_id_bytes(&bytes),
        name,
        path: path.display().to_string(),
        size: bytes.len() as u64,
        url: url.to_string(),
        source_page: Some(source_page.to_string()),
        downloaded_at: Utc::now(),
        status: DocStatus::NotIndexed,
        indexed: false,
    })
}

fn describe_existing(
    path: &Path,
    name: &str,
    url: &Url,
    source_page: &Url,
) -> std::io::Result<DocumentRecord> {
    let metadata = std::fs::metadata(path)?;
    let downloaded_at: DateTime<Utc> = metadata.modified()?.into();
    Ok(DocumentRecord {
        id: identity::content_id(path)?,
        name: name.to_string(),
        path: path.display().to_string(),
        size: metadata.len(),
        url: url.to_string(),
        source_page: Some(source_page.to_string()),
        downloaded_at,
        status: DocStatus::NotIndexed,
        indexed: false,
    })
}

fn log_fetch_failure(url: &Url, error: &FetchError) {
    match error {
        FetchError::TimedOut { attempts } => {
            tracing::warn!("Giving up on {} after {} timed-out attempt(s)", url, attempts)
        }
        _ => tracing::warn!("Failed to download {}: {}", url, error),
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::build_http_client;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn filename_from_last_path_segment() {
        assert_eq!(
            filename_for(&url("https://example.com/reports/annual.pdf")),
            "annual.pdf"
        );
        assert_eq!(filename_for(&url("https://example.com/a.pdf?v=2")), "a.pdf");
    }

    #[test]
    fn filename_falls_back_when_path_is_bare() {
        assert_eq!(filename_for(&url("https://example.com/")), "document.pdf");
        assert_eq!(filename_for(&url("https://example.com")), "document.pdf");
    }

    #[tokio::test]
    async fn existing_file_is_described_without_a_network_call() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cached.pdf"), b"%PDF cached bytes").unwrap();

        let client = build_http_client().unwrap();
        // Unroutable port: any network attempt would fail loudly
        let doc_url = url("http://127.0.0.1:1/cached.pdf");
        let page_url = url("http://127.0.0.1:1/index.html");
        let policy = RetryPolicy::new(1, Duration::from_millis(1));

        let record = acquire(
            &client,
            &doc_url,
            &page_url,
            dir.path(),
            &policy,
            Duration::from_secs(1),
        )
        .await
        .expect("cache hit should yield a record");

        assert_eq!(record.name, "cached.pdf");
        assert_eq!(record.size, 17);
        assert_eq!(record.id, identity::content_id_bytes(b"%PDF cached bytes"));
        assert_eq!(record.status, DocStatus::NotIndexed);
    }

    #[tokio::test]
    async fn unreachable_url_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let client = build_http_client().unwrap();
        let policy = RetryPolicy::new(1, Duration::from_millis(1));

        let record = acquire(
            &client,
            &url("http://127.0.0.1:1/missing.pdf"),
            &url("http://127.0.0.1:1/"),
            dir.path(),
            &policy,
            Duration::from_secs(1),
        )
        .await;

        assert!(record.is_none());
        assert!(!dir.path().join("missing.pdf").exists());
    }
}
