//! Vector store trait for persisting and searching embedded chunks.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{Chunk, SearchResult};
use crate::embedding::ProviderIdentity;
use crate::error::{RagError, Result};

/// The similarity metric a collection is searched with.
///
/// Fixed when the collection is created; switching metrics means rebuilding it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Cosine similarity, in `[-1, 1]`.
    #[default]
    Cosine,
    /// Raw dot product.
    InnerProduct,
}

impl DistanceMetric {
    /// Stable name used in persisted metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::InnerProduct => "inner_product",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cosine" => Ok(DistanceMetric::Cosine),
            "inner_product" => Ok(DistanceMetric::InnerProduct),
            other => Err(RagError::ConfigError(format!("unknown distance metric '{other}'"))),
        }
    }
}

/// What a collection was built with: vector size, metric and embedder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    /// Dimensionality of every vector in the collection.
    pub dimensions: usize,
    /// Similarity metric used for search.
    pub metric: DistanceMetric,
    /// The embedder that produced the vectors.
    pub provider: ProviderIdentity,
}

impl CollectionSpec {
    /// Create a cosine collection spec.
    pub fn new(dimensions: usize, provider: ProviderIdentity) -> Self {
        Self { dimensions, metric: DistanceMetric::Cosine, provider }
    }

    /// Set the similarity metric.
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Fail unless `other` describes vectors that can share this collection.
    pub fn ensure_compatible(&self, collection: &str, other: &CollectionSpec) -> Result<()> {
        if self.provider != other.provider {
            return Err(RagError::ProviderMismatch {
                collection: collection.to_string(),
                expected: self.provider.to_string(),
                actual: other.provider.to_string(),
            });
        }
        if self.dimensions != other.dimensions {
            return Err(RagError::DimensionMismatch {
                collection: collection.to_string(),
                expected: self.dimensions,
                actual: other.dimensions,
            });
        }
        if self.metric != other.metric {
            return Err(RagError::ConfigError(format!(
                "collection '{collection}' uses the {} metric, not {}; rebuild it with pre-delete",
                self.metric, other.metric
            )));
        }
        Ok(())
    }

    /// Fail unless every chunk carries a vector of this spec's size.
    pub fn ensure_chunks_fit(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        match chunks.iter().find(|c| c.embedding.len() != self.dimensions) {
            Some(bad) => Err(RagError::DimensionMismatch {
                collection: collection.to_string(),
                expected: self.dimensions,
                actual: bad.embedding.len(),
            }),
            None => Ok(()),
        }
    }
}

/// A storage backend for embedded chunks with similarity search.
///
/// Implementations manage named collections. A collection is written in bulk
/// by [`upsert_collection`](VectorStore::upsert_collection) and read with
/// [`nearest`](VectorStore::nearest); there is no per-record mutation.
///
/// # Example
///
/// ```rust,ignore
/// use pdfqa_rag::{CollectionSpec, InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.upsert_collection("pdf_documents_openai", &spec, &chunks, true).await?;
/// let results = store.nearest("pdf_documents_openai", &query_embedding, 10).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Short backend name used in logs and errors.
    fn backend(&self) -> &str;

    /// Return the spec a collection was built with, or `None` if it does not exist.
    async fn collection_info(&self, name: &str) -> Result<Option<CollectionSpec>>;

    /// Persist `chunks` under `name` as one all-or-nothing operation.
    ///
    /// With `pre_delete`, any existing collection of that name is replaced.
    /// Without it, the chunks are added to the existing collection, whose spec
    /// must be compatible with `spec`. Chunks must have embeddings of
    /// `spec.dimensions` length. On failure the collection keeps its prior state.
    async fn upsert_collection(
        &self,
        name: &str,
        spec: &CollectionSpec,
        chunks: &[Chunk],
        pre_delete: bool,
    ) -> Result<()>;

    /// Delete a named collection and all its data. No-op if it does not exist.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Return up to `k` chunks most similar to `query`, by descending score.
    ///
    /// A missing or empty collection yields an empty result. A query vector of
    /// the wrong size is a [`RagError::DimensionMismatch`].
    async fn nearest(&self, name: &str, query: &[f32], k: usize) -> Result<Vec<SearchResult>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(provider: &str, dims: usize) -> CollectionSpec {
        CollectionSpec::new(dims, ProviderIdentity::new(provider, "m"))
    }

    #[test]
    fn metric_names_round_trip() {
        for metric in [DistanceMetric::Cosine, DistanceMetric::InnerProduct] {
            assert_eq!(metric.as_str().parse::<DistanceMetric>().unwrap(), metric);
        }
        assert!("l2".parse::<DistanceMetric>().is_err());
    }

    #[test]
    fn provider_difference_is_reported_before_dimensions() {
        let err = spec("openai", 1536).ensure_compatible("c", &spec("gemini", 768)).unwrap_err();
        assert!(matches!(err, RagError::ProviderMismatch { .. }));
    }

    #[test]
    fn dimension_difference_is_reported() {
        let err = spec("openai", 1536).ensure_compatible("c", &spec("openai", 3072)).unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 1536, actual: 3072, .. }));
    }

    #[test]
    fn metric_difference_is_a_config_error() {
        let other = spec("openai", 4).with_metric(DistanceMetric::InnerProduct);
        let err = spec("openai", 4).ensure_compatible("c", &other).unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
    }
}
