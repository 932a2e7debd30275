//! Pipeline orchestration
//!
//! One run: load the manifest, collect the pending backlog, crawl,
//! index the backlog and the fresh downloads as two separate batches,
//! fold the results back into the manifest. The backlog batch is
//! applied to the manifest before the fresh batch, so when both
//! describe the same content hash the more recent observation wins.
//!
//! This module owns the failure-recovery guarantee: when the search
//! engine is unreachable, newly downloaded files are still recorded
//! (status `not_indexed`) so a later run's pending pass retries them,
//! and the run reports a deferred outcome rather than a bare failure.

use crate::crawler::Crawler;
use crate::index::{EngineError, IndexInput, Indexer, SearchEngine, TextExtractor};
use crate::manifest::{self, DocumentRecord};
use crate::HarvestError;
use std::path::PathBuf;

/// Counters for a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Documents acquired by this run's crawl (including cache hits)
    pub downloaded: usize,
    /// Fresh downloads newly written to the engine
    pub indexed_new: u64,
    /// Backlog documents newly written to the engine
    pub indexed_pending: u64,
    pub duplicates: u64,
    pub skipped: u64,
    /// Total documents in the manifest after the fold
    pub library_total: u64,
}

/// Outcome of a pipeline run
///
/// `Deferred` is not an error: the crawl succeeded and every download
/// is safe in the manifest; only the indexing work moved to a future
/// run.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunReport),
    Deferred {
        downloaded: usize,
        library_total: u64,
        reason: String,
    },
}

/// Sequences crawl, backlog, indexing, and the manifest fold
pub struct Pipeline<E, X> {
    crawler: Crawler,
    indexer: Indexer<E, X>,
    download_dir: PathBuf,
}

impl<E: SearchEngine, X: TextExtractor> Pipeline<E, X> {
    pub fn new(crawler: Crawler, indexer: Indexer<E, X>, download_dir: PathBuf) -> Self {
        Self {
            crawler,
            indexer,
            download_dir,
        }
    }

    pub async fn run(&self, start_url: &str) -> Result<RunOutcome, HarvestError> {
        let manifest = manifest::load(&self.download_dir);
        let backlog = manifest::pending(&manifest);
        if !backlog.is_empty() {
            tracing::info!(
                "{} document(s) pending from previous runs",
                backlog.len()
            );
        }

        let downloaded = self.crawler.crawl(start_url, &self.download_dir).await?;

        let backlog_inputs: Vec<IndexInput> = backlog.iter().map(IndexInput::from).collect();
        let backlog_result = match self.indexer.index_many(&backlog_inputs).await {
            Ok(result) => result,
            Err(e) => return self.defer(&downloaded, &[], e),
        };

        let fresh_inputs: Vec<IndexInput> = downloaded.iter().map(IndexInput::from).collect();
        let fresh_result = match self.indexer.index_many(&fresh_inputs).await {
            Ok(result) => result,
            // The backlog pass already made progress; keep it
            Err(e) => return self.defer(&downloaded, &backlog_result.documents, e),
        };

        let mut records = backlog_result.documents;
        records.extend(fresh_result.documents);
        let manifest = manifest::update(&self.download_dir, &records)?;

        Ok(RunOutcome::Completed(RunReport {
            downloaded: downloaded.len(),
            indexed_new: fresh_result.indexed,
            indexed_pending: backlog_result.indexed,
            duplicates: backlog_result.duplicates + fresh_result.duplicates,
            skipped: backlog_result.skipped + fresh_result.skipped,
            library_total: manifest.stats.total,
        }))
    }

    /// Records what this run achieved before the engine went away
    ///
    /// Downloads land in the manifest as `not_indexed`; the untouched
    /// part of the pending set keeps its existing records.
    fn defer(
        &self,
        downloaded: &[DocumentRecord],
        partial: &[DocumentRecord],
        error: EngineError,
    ) -> Result<RunOutcome, HarvestError> {
        let mut records: Vec<DocumentRecord> = partial.to_vec();
        records.extend(downloaded.iter().cloned());
        let manifest = manifest::update(&self.download_dir, &records)?;

        tracing::warn!(
            "Search engine unavailable; {} download(s) recorded for later indexing: {}",
            downloaded.len(),
            error
        );
        Ok(RunOutcome::Deferred {
            downloaded: downloaded.len(),
            library_total: manifest.stats.total,
            reason: error.to_string(),
        })
    }
}
