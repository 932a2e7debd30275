//! Manifest persistence: load, merge-update, and pending queries
//!
//! The ledger is a single JSON file per download directory, read once
//! at the start of a run and written once at the end (read-merge-write).
//! Loading is fail-soft: a missing or malformed file yields an empty
//! manifest, never an error, because a first run has no ledger.
//! Concurrent runs against the same directory are not supported and
//! must be serialized by the caller.

use crate::manifest::{DocStatus, DocumentRecord, Manifest, ManifestStats};
use chrono::Utc;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Errors that can occur while writing the ledger
///
/// Loading never fails; only `update` can return an error.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to persist manifest: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Path of the ledger file inside a download directory
pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILENAME)
}

/// Loads the ledger from `dir`, or an empty manifest if there is none
///
/// Malformed content is treated the same as a missing file: the ledger
/// is rebuilt from scratch on the next write. Statistics are recomputed
/// at load time rather than trusted from the file.
pub fn load(dir: &Path) -> Manifest {
    let path = manifest_path(dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Manifest::default(),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}; treating as empty", path.display(), e);
            return Manifest::default();
        }
    };

    let mut manifest: Manifest = match serde_json::from_str(&content) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::warn!(
                "Malformed manifest at {}: {}; treating as empty",
                path.display(),
                e
            );
            return Manifest::default();
        }
    };

    for doc in &mut manifest.documents {
        // Ledgers written before the indexed flag existed
        doc.indexed = doc.indexed || doc.status == DocStatus::Indexed;
    }
    manifest.stats = ManifestStats::compute(&manifest.documents);
    manifest
}

/// Merges `records` into the ledger at `dir` and writes it back
///
/// Records are applied in input order; when two records describe the
/// same content hash, the later one wins per descriptive field. Status
/// only moves upward along the lattice and the `indexed` flag is the
/// logical OR of old and new. If nothing changed and a ledger already
/// exists, the write is skipped entirely.
pub fn update(dir: &Path, records: &[DocumentRecord]) -> Result<Manifest, ManifestError> {
    std::fs::create_dir_all(dir)?;
    let path = manifest_path(dir);

    let existing = load(dir);
    let mut by_hash: BTreeMap<String, DocumentRecord> = existing
        .documents
        .iter()
        .map(|doc| (doc.id.clone(), doc.clone()))
        .collect();

    let mut changed = false;
    for record in records {
        if record.id.is_empty() {
            tracing::warn!("Dropping manifest record without content id: {}", record.url);
            continue;
        }
        let merged = merge_record(by_hash.get(&record.id), record);
        if by_hash.get(&record.id) != Some(&merged) {
            by_hash.insert(record.id.clone(), merged);
            changed = true;
        }
    }

    if !changed && path.exists() {
        return Ok(existing);
    }

    let mut documents: Vec<DocumentRecord> = by_hash.into_values().collect();
    // Most recent download first, id as tie-break for a stable file
    documents.sort_by(|a, b| {
        b.downloaded_at
            .cmp(&a.downloaded_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let manifest = Manifest {
        stats: ManifestStats::compute(&documents),
        documents,
        updated_at: Some(Utc::now()),
    };

    write_atomic(&path, &serde_json::to_vec_pretty(&manifest)?)?;
    tracing::debug!(
        "Wrote manifest with {} document(s) to {}",
        manifest.stats.total,
        path.display()
    );
    Ok(manifest)
}

/// Documents whose status has not yet reached `indexed`
///
/// This is the recovery mechanism: documents downloaded during a search
/// engine outage stay pending and are retried on a later run without
/// being re-downloaded.
pub fn pending(manifest: &Manifest) -> Vec<DocumentRecord> {
    manifest
        .documents
        .iter()
        .filter(|doc| doc.status != DocStatus::Indexed)
        .cloned()
        .collect()
}

fn merge_record(existing: Option<&DocumentRecord>, incoming: &DocumentRecord) -> DocumentRecord {
    let Some(existing) = existing else {
        return incoming.clone();
    };

    let mut merged = incoming.clone();
    if merged.source_page.is_none() {
        merged.source_page = existing.source_page.clone();
    }
    if incoming.status.rank() < existing.status.rank() {
        merged.status = existing.status;
    }
    merged.indexed = existing.indexed || incoming.indexed;
    merged
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ManifestError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.persist(path)?;
    Ok(())
}
