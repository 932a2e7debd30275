//! Indexing module: text extraction, engine client, and dedup pipeline
//!
//! This module turns downloaded files into searchable documents:
//! - a `SearchEngine` trait with an Elasticsearch REST implementation
//! - a `TextExtractor` trait with a `pdf-extract` implementation
//! - the `Indexer`, which deduplicates by content hash against the
//!   engine and drives per-document and batch indexing

mod engine;
mod extract;
mod indexer;

pub use engine::{EngineError, HttpSearchEngine, IndexedDocument, SearchEngine, SearchHit};
pub use extract::{ExtractError, PdfTextExtractor, TextExtractor};
pub use indexer::{IndexBatchResult, IndexError, IndexInput, Indexer};

/// Default result size for search queries
pub const DEFAULT_SEARCH_SIZE: usize = 20;
