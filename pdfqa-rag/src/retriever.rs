//! Top-k retrieval over one collection.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::RagConfig;
use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::{CollectionSpec, VectorStore};

/// Default time budget for each embedding and index call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The outcome of a retrieval.
///
/// Both [`Retrieval::Empty`] and [`Retrieval::Degraded`] carry no passages and
/// format the same way; only the latter means something went wrong.
#[derive(Debug, Clone)]
pub enum Retrieval {
    /// Passages ordered by descending score.
    Found(Vec<SearchResult>),
    /// The collection is missing, empty, or nothing cleared the threshold.
    Empty,
    /// Embedding or search failed; the cause has already been logged.
    Degraded {
        /// Description of the failure.
        reason: String,
    },
}

impl Retrieval {
    /// The retrieved passages, empty unless [`Retrieval::Found`].
    pub fn results(&self) -> &[SearchResult] {
        match self {
            Retrieval::Found(results) => results,
            Retrieval::Empty | Retrieval::Degraded { .. } => &[],
        }
    }

    /// Whether the retrieval failed internally.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Retrieval::Degraded { .. })
    }
}

/// Embeds a question and fetches the closest chunks from a collection.
///
/// The embedder must be the same provider and model that built the
/// collection; queries from any other identity are refused.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
    top_k: usize,
    similarity_threshold: f32,
    timeout: Duration,
}

impl Retriever {
    /// Create a retriever over `collection` using `top_k` and
    /// `similarity_threshold` from `config`.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        config: &RagConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            collection: collection.into(),
            top_k: config.top_k,
            similarity_threshold: config.similarity_threshold,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the time budget for each network call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The collection this retriever reads.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Retrieve the configured top-k passages for `question`.
    pub async fn retrieve(&self, question: &str) -> Retrieval {
        self.retrieve_top_k(question, self.top_k).await
    }

    /// Retrieve up to `k` passages for `question`.
    ///
    /// Never fails: errors are logged here and reported as [`Retrieval::Degraded`].
    pub async fn retrieve_top_k(&self, question: &str, k: usize) -> Retrieval {
        match self.search(question, k).await {
            Ok(results) if results.is_empty() => {
                debug!(collection = %self.collection, "no passages retrieved");
                Retrieval::Empty
            }
            Ok(results) => {
                debug!(collection = %self.collection, count = results.len(), "retrieved passages");
                Retrieval::Found(results)
            }
            Err(e) => {
                warn!(
                    collection = %self.collection,
                    error = %e,
                    "retrieval failed, continuing without context"
                );
                Retrieval::Degraded { reason: e.to_string() }
            }
        }
    }

    async fn search(&self, question: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let Some(spec) = self.collection_spec().await? else {
            return Ok(Vec::new());
        };
        self.ensure_matches(&spec)?;

        let query = self.bounded("query embedding", self.embedder.embed_query(question)).await?;
        let mut results =
            self.bounded("vector search", self.store.nearest(&self.collection, &query, k)).await?;

        results.retain(|r| r.score >= self.similarity_threshold);
        Ok(results)
    }

    /// Check the stored collection against the active embedder.
    ///
    /// Returns the collection's spec, or `None` (with a warning) if it has not
    /// been ingested yet. A different provider or size is an error.
    pub async fn verify_collection(&self) -> Result<Option<CollectionSpec>> {
        let spec = self.collection_spec().await?;
        match &spec {
            Some(spec) => {
                self.ensure_matches(spec)?;
                info!(
                    collection = %self.collection,
                    provider = %spec.provider,
                    dimensions = spec.dimensions,
                    "collection verified"
                );
            }
            None => {
                warn!(collection = %self.collection, "collection not found, run ingestion first");
            }
        }
        Ok(spec)
    }

    fn ensure_matches(&self, spec: &CollectionSpec) -> Result<()> {
        let active = self.embedder.identity();
        if spec.provider != active {
            return Err(RagError::ProviderMismatch {
                collection: self.collection.clone(),
                expected: spec.provider.to_string(),
                actual: active.to_string(),
            });
        }
        if spec.dimensions != self.embedder.dimensions() {
            return Err(RagError::DimensionMismatch {
                collection: self.collection.clone(),
                expected: spec.dimensions,
                actual: self.embedder.dimensions(),
            });
        }
        Ok(())
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        future: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.timeout, future).await.map_err(|_| RagError::Timeout {
            operation: operation.to_string(),
            seconds: self.timeout.as_secs(),
        })?
    }

    async fn collection_spec(&self) -> Result<Option<CollectionSpec>> {
        self.bounded("collection lookup", self.store.collection_info(&self.collection)).await
    }
}
