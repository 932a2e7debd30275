use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Pdf-Harvest
///
/// Every section and field has a default, so a config file is optional
/// and may specify only the fields it wants to override.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub index: IndexConfig,
    pub storage: StorageConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Attempts per URL before it is abandoned
    pub retries: u32,

    /// Fixed delay between retry attempts (seconds)
    pub retry_delay_secs: u64,

    /// Per-request timeout for HTML pages (seconds)
    pub page_timeout_secs: u64,

    /// Per-request timeout for binary downloads (seconds); larger to
    /// tolerate bigger payloads
    pub download_timeout_secs: u64,

    /// Hosts the crawl may follow links into, with or without port.
    /// Empty means no restriction beyond what the CLI supplies.
    pub allowed_hosts: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay_secs: 5,
            page_timeout_secs: 15,
            download_timeout_secs: 30,
            allowed_hosts: Vec::new(),
        }
    }
}

/// Search engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IndexConfig {
    /// Base URL of the search engine HTTP API
    pub engine_url: String,

    /// Name of the index holding the documents
    pub index_name: String,

    /// Timeout for engine requests (seconds)
    pub request_timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            engine_url: "http://localhost:9200".to_string(),
            index_name: "documents".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Directory downloaded documents and the manifest live in
    pub download_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("./downloads"),
        }
    }
}
