//! Breadth-first crawl loop
//!
//! Dequeues one URL at a time, fetches it, extracts links, routes PDF
//! candidates to acquisition and everything else back into the
//! frontier. A failed page abandons that URL only; the traversal runs
//! until the frontier drains. There is no depth or page-count ceiling,
//! so an unscoped crawl of the open web will not terminate — host
//! scoping is what bounds a run to an intranet or a single site.

use crate::config::CrawlerConfig;
use crate::crawler::acquire::acquire;
use crate::crawler::fetcher::{build_http_client, fetch_page, RetryPolicy};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{extract_links, is_pdf_url};
use crate::manifest::DocumentRecord;
use reqwest::Client;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that abort a crawl before it starts
///
/// Once the loop is running, per-URL failures are absorbed and logged;
/// nothing inside the loop is crawl-fatal.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid start URL {url}: {source}")]
    InvalidStartUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Failed to create download directory {path}: {source}")]
    DownloadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Breadth-first site crawler producing downloaded-document descriptors
pub struct Crawler {
    client: Client,
    page_policy: RetryPolicy,
    page_timeout: Duration,
    download_timeout: Duration,
    allowed_hosts: Option<HashSet<String>>,
}

impl Crawler {
    /// Builds a crawler with its own HTTP client, constructed once per
    /// run and owned here
    pub fn new(
        config: &CrawlerConfig,
        allowed_hosts: Option<HashSet<String>>,
    ) -> Result<Self, CrawlError> {
        Ok(Self {
            client: build_http_client()?,
            page_policy: RetryPolicy::new(
                config.retries,
                Duration::from_secs(config.retry_delay_secs),
            ),
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            download_timeout: Duration::from_secs(config.download_timeout_secs),
            allowed_hosts,
        })
    }

    /// Crawls from `start_url`, materializing documents into
    /// `download_dir`
    ///
    /// # Arguments
    ///
    /// * `start_url` - Seed page the frontier starts with
    /// * `download_dir` - Directory documents are written into;
    ///   created if missing
    ///
    /// # Returns
    ///
    /// Descriptors for every document acquired this run, including
    /// ones already on disk from earlier runs. Per-URL failures are
    /// logged and absorbed; only an unusable seed URL or download
    /// directory is an error.
    pub async fn crawl(
        &self,
        start_url: &str,
        download_dir: &Path,
    ) -> Result<Vec<DocumentRecord>, CrawlError> {
        let start = Url::parse(start_url).map_err(|source| CrawlError::InvalidStartUrl {
            url: start_url.to_string(),
            source,
        })?;
        std::fs::create_dir_all(download_dir).map_err(|source| CrawlError::DownloadDir {
            path: download_dir.to_path_buf(),
            source,
        })?;

        let mut frontier = Frontier::new(self.allowed_hosts.clone());
        frontier.seed(start);

        let mut documents = Vec::new();
        let mut pages_fetched = 0usize;

        while let Some(url) = frontier.pop() {
            tracing::debug!("Fetching page {}", url);
            let page = match fetch_page(&self.client, &url, &self.page_policy, self.page_timeout)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Abandoning {}: {}", url, e);
                    continue;
                }
            };
            pages_fetched += 1;

            for link in extract_links(&page.body, &page.final_url) {
                if !frontier.in_scope(&link) {
                    tracing::trace!("Out of scope: {}", link);
                    continue;
                }
                if is_pdf_url(&link) {
                    if !frontier.mark_seen(&link) {
                        continue;
                    }
                    tracing::info!("Document candidate: {}", link);
                    if let Some(doc) = acquire(
                        &self.client,
                        &link,
                        &page.final_url,
                        download_dir,
                        &self.page_policy,
                        self.download_timeout,
                    )
                    .await
                    {
                        documents.push(doc);
                    }
                } else {
                    frontier.push(link);
                }
            }
        }

        tracing::info!(
            "Crawl complete: {} page(s) fetched, {} document(s) acquired",
            pages_fetched,
            documents.len()
        );
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlerConfig;

    fn test_config() -> CrawlerConfig {
        CrawlerConfig {
            retries: 1,
            retry_delay_secs: 0,
            page_timeout_secs: 2,
            download_timeout_secs: 2,
            allowed_hosts: Vec::new(),
        }
    }

    #[tokio::test]
    async fn invalid_start_url_is_an_error() {
        let crawler = Crawler::new(&test_config(), None).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = crawler.crawl("not a url", dir.path()).await.unwrap_err();
        assert!(matches!(err, CrawlError::InvalidStartUrl { .. }));
    }

    #[tokio::test]
    async fn unreachable_seed_yields_empty_crawl() {
        let crawler = Crawler::new(&test_config(), None).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let documents = crawler
            .crawl("http://127.0.0.1:1/", dir.path())
            .await
            .unwrap();
        assert!(documents.is_empty());
    }
}
