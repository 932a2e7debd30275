//! Search engine client
//!
//! The engine is an external collaborator reached over HTTP
//! (Elasticsearch-compatible API). The `SearchEngine` trait is the
//! seam: the indexer and pipeline are generic over it, the production
//! implementation is a thin REST client, and tests substitute fakes.
//! The client is constructed once at composition time and passed in;
//! there is no process-wide cached instance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors from search engine operations
///
/// `Unavailable` is the one condition that aborts a whole indexing
/// batch: retrying individual documents against a dead engine cannot
/// succeed. Everything else is a per-document failure.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Search engine unreachable: {0}")]
    Unavailable(String),

    #[error("Search engine rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed search engine response: {0}")]
    Response(String),
}

/// Document payload as stored in the search index
///
/// `sha256` doubles as the engine-side document id.
#[derive(Debug, Clone, Serialize)]
pub struct IndexedDocument {
    pub name: String,
    pub size: u64,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_page: Option<String>,
    pub downloaded_at: DateTime<Utc>,
    pub sha256: String,
    pub content: String,
}

/// A single search result with its highlighted snippet
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub score: f64,
    pub name: String,
    pub url: String,
    pub sha256: String,
    pub size: u64,
    /// Snippet of `content` around the match, with `<em>` markers
    pub highlight: Option<String>,
}

/// Remote capability exposed by the search engine
pub trait SearchEngine {
    /// Creates the index with its mapping if it does not exist yet
    fn ensure_index(&self) -> impl Future<Output = Result<(), EngineError>>;

    /// Existence check by content id
    fn exists(&self, id: &str) -> impl Future<Output = Result<bool, EngineError>>;

    /// Writes a document so that it is visible to an immediately
    /// following existence check or search
    fn upsert(
        &self,
        id: &str,
        doc: &IndexedDocument,
    ) -> impl Future<Output = Result<(), EngineError>>;

    /// Multi-field search returning at most `size` hits
    fn search(
        &self,
        query: &str,
        size: usize,
    ) -> impl Future<Output = Result<Vec<SearchHit>, EngineError>>;
}

/// Elasticsearch REST client
#[derive(Debug, Clone)]
pub struct HttpSearchEngine {
    http: reqwest::Client,
    base_url: String,
    index: String,
}

impl HttpSearchEngine {
    /// Builds a client for the engine at `base_url` (e.g.
    /// `http://localhost:9200`) using index `index`
    pub fn new(base_url: &str, index: &str, timeout: Duration) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
        })
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.base_url, self.index)
    }

    fn doc_url(&self, id: &str) -> String {
        format!("{}/{}/_doc/{}", self.base_url, self.index, id)
    }

    /// A request that never reached the engine means the engine is
    /// unreachable; the caller defers indexing rather than failing
    fn unreachable(e: reqwest::Error) -> EngineError {
        EngineError::Unavailable(e.to_string())
    }

    async fn rejected(response: reqwest::Response) -> EngineError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        EngineError::Rejected { status, body }
    }

    fn mapping() -> serde_json::Value {
        json!({
            "mappings": {
                "properties": {
                    "name": { "type": "text", "fields": { "keyword": { "type": "keyword" } } },
                    "size": { "type": "long" },
                    "url": { "type": "keyword" },
                    "source_page": { "type": "keyword" },
                    "downloaded_at": { "type": "date" },
                    "sha256": { "type": "keyword" },
                    "content": { "type": "text", "analyzer": "english" }
                }
            }
        })
    }
}

impl SearchEngine for HttpSearchEngine {
    async fn ensure_index(&self) -> Result<(), EngineError> {
        let response = self
            .http
            .head(self.index_url())
            .send()
            .await
            .map_err(Self::unreachable)?;
        match response.status().as_u16() {
            200 => return Ok(()),
            404 => {}
            _ => return Err(Self::rejected(response).await),
        }

        tracing::info!("Creating search index {}", self.index);
        let response = self
            .http
            .put(self.index_url())
            .json(&Self::mapping())
            .send()
            .await
            .map_err(Self::unreachable)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejected(response).await)
        }
    }

    async fn exists(&self, id: &str) -> Result<bool, EngineError> {
        let response = self
            .http
            .head(self.doc_url(id))
            .send()
            .await
            .map_err(Self::unreachable)?;
        match response.status().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            _ => Err(Self::rejected(response).await),
        }
    }

    async fn upsert(&self, id: &str, doc: &IndexedDocument) -> Result<(), EngineError> {
        // wait_for makes the document visible to the next existence
        // check or search within the same pipeline run
        let response = self
            .http
            .put(format!("{}?refresh=wait_for", self.doc_url(id)))
            .json(doc)
            .send()
            .await
            .map_err(Self::unreachable)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejected(response).await)
        }
    }

    async fn search(&self, query: &str, size: usize) -> Result<Vec<SearchHit>, EngineError> {
        let body = json!({
            "size": size,
            "query": {
                "multi_match": {
                    "query": query,
                    "fields": ["name^2", "content", "url", "source_page"],
                    "type": "best_fields"
                }
            },
            "highlight": {
                "fields": {
                    "content": { "fragment_size": 200, "number_of_fragments": 1 }
                }
            }
        });

        let response = self
            .http
            .post(format!("{}/_search", self.index_url()))
            .json(&body)
            .send()
            .await
            .map_err(Self::unreachable)?;
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let parsed: EsSearchResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Response(e.to_string()))?;
        Ok(parsed
            .hits
            .hits
            .into_iter()
            .map(|hit| SearchHit {
                score: hit.score.unwrap_or(0.0),
                name: hit.source.name,
                url: hit.source.url,
                sha256: hit.source.sha256,
                size: hit.source.size,
                highlight: hit
                    .highlight
                    .and_then(|h| h.content.into_iter().next()),
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct EsSearchResponse {
    hits: EsHits,
}

#[derive(Debug, Deserialize)]
struct EsHits {
    #[serde(default)]
    hits: Vec<EsHit>,
}

#[derive(Debug, Deserialize)]
struct EsHit {
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source")]
    source: EsSource,
    highlight: Option<EsHighlight>,
}

#[derive(Debug, Deserialize)]
struct EsSource {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    sha256: String,
    #[serde(default)]
    size: u64,
}

#[derive(Debug, Deserialize)]
struct EsHighlight {
    #[serde(default)]
    content: Vec<String>,
}
