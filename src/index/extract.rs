//! Text extraction seam
//!
//! Extraction is a pure bytes-to-text function behind a trait so the
//! indexer can be exercised without real PDFs. An empty or
//! whitespace-only result is not an error; the indexer records it as
//! the `no_text` status.

use thiserror::Error;

/// Errors from the extraction backend
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Text extraction failed: {0}")]
    Backend(String),
}

/// Pure bytes -> text extraction
pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Extractor backed by the `pdf-extract` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Backend(e.to_string()))
    }
}
