//! Embedding provider trait for generating vector embeddings from text.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The stable identity of an embedding model.
///
/// Vectors are only comparable when they come from the same identity, so it
/// is recorded with every collection and checked before queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderIdentity {
    /// Provider name, e.g. `"openai"`.
    pub provider: String,
    /// Model name, e.g. `"text-embedding-3-small"`.
    pub model: String,
}

impl ProviderIdentity {
    /// Create a new identity.
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self { provider: provider.into(), model: model.into() }
    }
}

impl fmt::Display for ProviderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends (Gemini, OpenAI, etc.)
/// behind a unified async interface. The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// implementation calls [`embed`](EmbeddingProvider::embed) sequentially;
/// backends that support native batching should override it.
///
/// # Example
///
/// ```rust,ignore
/// use pdfqa_rag::EmbeddingProvider;
///
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially for each input. Override this method if the backend
    /// supports native batch embedding for better throughput.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Generate an embedding for a search query.
    ///
    /// Defaults to [`embed`](EmbeddingProvider::embed). Backends with
    /// asymmetric document/query task types override it.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text).await
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Return the provider and model that produce these embeddings.
    fn identity(&self) -> ProviderIdentity;
}

/// Check that every vector has the provider's advertised dimensionality.
#[cfg(any(feature = "openai", feature = "gemini"))]
pub(crate) fn check_dimensions(
    provider: &str,
    expected: usize,
    vectors: &[Vec<f32>],
) -> Result<()> {
    if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
        return Err(crate::error::RagError::EmbeddingError {
            provider: provider.to_string(),
            message: format!("expected {expected}-dimensional vectors, got {}", bad.len()),
        });
    }
    Ok(())
}
