//! Pdf-Harvest: a crawling PDF library builder
//!
//! This crate crawls a site breadth-first for links to PDF documents,
//! downloads them, extracts their text, and indexes them into a search
//! engine. A durable per-directory manifest records every document ever
//! seen together with its indexing status, so documents downloaded while
//! the search engine was unreachable are indexed on a later run without
//! being re-downloaded.

pub mod config;
pub mod crawler;
pub mod identity;
pub mod index;
pub mod manifest;
pub mod pipeline;

use thiserror::Error;

/// Main error type for Pdf-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] crawler::CrawlError),

    #[error("Search engine error: {0}")]
    Engine(#[from] index::EngineError),

    #[error("Indexing error: {0}")]
    Index(#[from] index::IndexError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] manifest::ManifestError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Pdf-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use manifest::{DocStatus, DocumentRecord, Manifest};
pub use pipeline::{Pipeline, RunOutcome, RunReport};
