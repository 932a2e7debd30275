//! Document indexing with content-hash deduplication
//!
//! `index_one` takes a file on disk through the full pipeline step:
//! hash, extract, existence check, upsert. `index_many` drives a batch,
//! absorbing per-document failures as skips but aborting the whole
//! batch when the engine itself is unreachable, since retrying
//! individual documents against a dead engine cannot succeed.

use crate::identity;
use crate::index::engine::{EngineError, IndexedDocument, SearchEngine};
use crate::index::extract::TextExtractor;
use crate::manifest::{DocStatus, DocumentRecord};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Per-document indexing errors
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Document file missing: {0}")]
    MissingFile(PathBuf),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Text extraction failed for {path}: {message}")]
    Extract { path: PathBuf, message: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// One document to index: the file plus its provenance
#[derive(Debug, Clone)]
pub struct IndexInput {
    pub path: PathBuf,
    pub url: String,
    pub source_page: Option<String>,
    /// When absent (ad-hoc indexing of a bare file), stamped with the
    /// current time
    pub downloaded_at: Option<DateTime<Utc>>,
}

impl From<&DocumentRecord> for IndexInput {
    fn from(doc: &DocumentRecord) -> Self {
        Self {
            path: PathBuf::from(&doc.path),
            url: doc.url.clone(),
            source_page: doc.source_page.clone(),
            downloaded_at: Some(doc.downloaded_at),
        }
    }
}

/// Aggregate result of one `index_many` invocation
///
/// Ephemeral; the orchestrator folds `documents` into the manifest.
#[derive(Debug, Default)]
pub struct IndexBatchResult {
    pub indexed: u64,
    pub duplicates: u64,
    pub skipped: u64,
    pub documents: Vec<DocumentRecord>,
}

/// Indexes documents against an injected engine and extractor
pub struct Indexer<E, X> {
    engine: E,
    extractor: X,
}

impl<E: SearchEngine, X: TextExtractor> Indexer<E, X> {
    pub fn new(engine: E, extractor: X) -> Self {
        Self { engine, extractor }
    }

    /// Indexes a single document file
    ///
    /// The returned record always carries the content id, even when the
    /// document was not written to the engine (`no_text`, `duplicate`);
    /// the document is known, just unsearchable or already present.
    pub async fn index_one(&self, input: &IndexInput) -> Result<DocumentRecord, IndexError> {
        let bytes = std::fs::read(&input.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IndexError::MissingFile(input.path.clone())
            } else {
                IndexError::Io {
                    path: input.path.clone(),
                    source: e,
                }
            }
        })?;

        let id = identity::content_id_bytes(&bytes);
        let mut record = DocumentRecord {
            id: id.clone(),
            name: file_name(&input.path),
            path: input.path.display().to_string(),
            size: bytes.len() as u64,
            url: input.url.clone(),
            source_page: input.source_page.clone(),
            downloaded_at: input.downloaded_at.unwrap_or_else(Utc::now),
            status: DocStatus::NotIndexed,
            indexed: false,
        };

        let content = self
            .extractor
            .extract(&bytes)
            .map_err(|e| IndexError::Extract {
                path: input.path.clone(),
                message: e.to_string(),
            })?;
        if content.trim().is_empty() {
            tracing::info!("No text extracted from {}; not indexing", record.name);
            record.status = DocStatus::NoText;
            return Ok(record);
        }

        if self.engine.exists(&id).await? {
            tracing::debug!("{} already indexed (id {})", record.name, id);
            record.status = DocStatus::Duplicate;
            return Ok(record);
        }

        let doc = IndexedDocument {
            name: record.name.clone(),
            size: record.size,
            url: record.url.clone(),
            source_page: record.source_page.clone(),
            downloaded_at: record.downloaded_at,
            sha256: id.clone(),
            content,
        };
        self.engine.upsert(&id, &doc).await?;
        tracing::info!("Indexed {}", record.name);
        record.status = DocStatus::Indexed;
        record.indexed = true;
        Ok(record)
    }

    /// Indexes a batch of documents, isolating per-document failures
    ///
    /// A missing file, an unreadable file, or a failed extraction skips
    /// just that document. An unreachable engine aborts the batch and
    /// propagates, so the caller can defer instead of silently
    /// degrading every remaining document to "skipped".
    pub async fn index_many(
        &self,
        inputs: &[IndexInput],
    ) -> Result<IndexBatchResult, EngineError> {
        let mut result = IndexBatchResult::default();
        for input in inputs {
            match self.index_one(input).await {
                Ok(record) => {
                    match record.status {
                        DocStatus::Indexed => result.indexed += 1,
                        DocStatus::Duplicate => result.duplicates += 1,
                        _ => result.skipped += 1,
                    }
                    result.documents.push(record);
                }
                Err(IndexError::Engine(e @ EngineError::Unavailable(_))) => return Err(e),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", input.path.display(), e);
                    result.skipped += 1;
                }
            }
        }
        Ok(result)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::engine::SearchHit;
    use crate::index::extract::ExtractError;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory engine; `available = false` simulates an outage
    struct FakeEngine {
        stored: Mutex<HashSet<String>>,
        available: bool,
    }

    impl FakeEngine {
        fn new() -> Self {
            Self {
                stored: Mutex::new(HashSet::new()),
                available: true,
            }
        }

        fn unavailable() -> Self {
            Self {
                stored: Mutex::new(HashSet::new()),
                available: false,
            }
        }
    }

    impl SearchEngine for &FakeEngine {
        async fn ensure_index(&self) -> Result<(), EngineError> {
            Ok(())
        }

        async fn exists(&self, id: &str) -> Result<bool, EngineError> {
            if !self.available {
                return Err(EngineError::Unavailable("connection refused".into()));
            }
            Ok(self.stored.lock().unwrap().contains(id))
        }

        async fn upsert(&self, id: &str, _doc: &IndexedDocument) -> Result<(), EngineError> {
            if !self.available {
                return Err(EngineError::Unavailable("connection refused".into()));
            }
            self.stored.lock().unwrap().insert(id.to_string());
            Ok(())
        }

        async fn search(&self, _query: &str, _size: usize) -> Result<Vec<SearchHit>, EngineError> {
            Ok(Vec::new())
        }
    }

    /// Treats file bytes as the extracted text
    struct PassthroughExtractor;

    impl TextExtractor for PassthroughExtractor {
        fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }

    fn write_file(dir: &std::path::Path, name: &str, bytes: &[u8]) -> IndexInput {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        IndexInput {
            path,
            url: format!("https://example.com/{name}"),
            source_page: Some("https://example.com/".to_string()),
            downloaded_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn identical_bytes_yield_one_indexed_one_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new();
        let indexer = Indexer::new(&engine, PassthroughExtractor);

        let inputs = vec![
            write_file(dir.path(), "first.pdf", b"same document text"),
            write_file(dir.path(), "second.pdf", b"same document text"),
        ];
        let result = indexer.index_many(&inputs).await.unwrap();

        assert_eq!(result.indexed, 1);
        assert_eq!(result.duplicates, 1);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.documents.len(), 2);
        assert_eq!(result.documents[0].id, result.documents[1].id);
        assert_eq!(result.documents[0].status, DocStatus::Indexed);
        assert_eq!(result.documents[1].status, DocStatus::Duplicate);
    }

    #[tokio::test]
    async fn reindexing_yields_all_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new();
        let indexer = Indexer::new(&engine, PassthroughExtractor);

        let inputs = vec![
            write_file(dir.path(), "a.pdf", b"document a"),
            write_file(dir.path(), "b.pdf", b"document b"),
        ];
        let first = indexer.index_many(&inputs).await.unwrap();
        assert_eq!(first.indexed, 2);

        let second = indexer.index_many(&inputs).await.unwrap();
        assert_eq!(second.indexed, 0);
        assert_eq!(second.duplicates, 2);
    }

    #[tokio::test]
    async fn empty_text_becomes_no_text_without_engine_write() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new();
        let indexer = Indexer::new(&engine, PassthroughExtractor);

        let input = write_file(dir.path(), "blank.pdf", b"   \n\t  ");
        let record = indexer.index_one(&input).await.unwrap();

        assert_eq!(record.status, DocStatus::NoText);
        assert!(!record.indexed);
        assert!(engine.stored.lock().unwrap().is_empty());
        // Returned for provenance: the id is still computed
        assert_eq!(record.id.len(), 64);
    }

    #[tokio::test]
    async fn missing_file_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new();
        let indexer = Indexer::new(&engine, PassthroughExtractor);

        let good = write_file(dir.path(), "good.pdf", b"text");
        let missing = IndexInput {
            path: dir.path().join("gone.pdf"),
            url: "https://example.com/gone.pdf".to_string(),
            source_page: None,
            downloaded_at: None,
        };
        let result = indexer.index_many(&[missing, good]).await.unwrap();

        assert_eq!(result.indexed, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.documents.len(), 1);
    }

    #[tokio::test]
    async fn unreachable_engine_aborts_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::unavailable();
        let indexer = Indexer::new(&engine, PassthroughExtractor);

        let inputs = vec![write_file(dir.path(), "a.pdf", b"document a")];
        let err = indexer.index_many(&inputs).await.unwrap_err();
        assert!(matches!(err, EngineError::Unavailable(_)));
    }

    #[tokio::test]
    async fn extraction_failure_is_skipped() {
        struct FailingExtractor;
        impl TextExtractor for FailingExtractor {
            fn extract(&self, _bytes: &[u8]) -> Result<String, ExtractError> {
                Err(ExtractError::Backend("corrupt xref table".into()))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new();
        let indexer = Indexer::new(&engine, FailingExtractor);

        let inputs = vec![write_file(dir.path(), "bad.pdf", b"not really a pdf")];
        let result = indexer.index_many(&inputs).await.unwrap();

        assert_eq!(result.skipped, 1);
        assert!(result.documents.is_empty());
    }
}
