//! Durable document ledger
//!
//! This module owns the only persisted state of the system: a JSON
//! manifest per download directory recording every document ever seen,
//! keyed by content hash, with its latest known status and aggregate
//! statistics. The ledger is append/merge-only; documents are never
//! deleted, and status merges only move upward along the lattice.

mod status;
mod store;

pub use status::DocStatus;
pub use store::{load, manifest_path, pending, update, ManifestError, MANIFEST_FILENAME};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A downloaded document as recorded in the ledger
///
/// `id` is the lowercase hex SHA-256 of the file's bytes and is the
/// canonical identity: two files with identical bytes are the same
/// document regardless of name or source URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_page: Option<String>,
    pub downloaded_at: DateTime<Utc>,
    #[serde(default)]
    pub status: DocStatus,
    #[serde(default)]
    pub indexed: bool,
}

/// Aggregate counters recomputed over the full document set on every
/// ledger write
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestStats {
    pub total: u64,
    pub indexed: u64,
    pub duplicates: u64,
    pub skipped: u64,
    pub total_size: u64,
    #[serde(default)]
    pub status_breakdown: BTreeMap<String, u64>,
}

/// The persisted ledger: documents plus derived statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub documents: Vec<DocumentRecord>,
    #[serde(default)]
    pub stats: ManifestStats,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ManifestStats {
    /// Computes statistics over a document set
    ///
    /// `skipped` counts everything that is neither indexed nor a
    /// duplicate: not-yet-indexed backlog, text-less documents, and
    /// unknown statuses.
    pub fn compute(documents: &[DocumentRecord]) -> Self {
        let mut stats = Self::default();
        for doc in documents {
            stats.total += 1;
            stats.total_size += doc.size;
            *stats
                .status_breakdown
                .entry(doc.status.as_str().to_string())
                .or_insert(0) += 1;
            match doc.status {
                DocStatus::Indexed => stats.indexed += 1,
                DocStatus::Duplicate => stats.duplicates += 1,
                _ => stats.skipped += 1,
            }
        }
        stats
    }
}
