//! In-memory vector store.
//!
//! This module provides [`InMemoryVectorStore`], a zero-dependency vector store
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. It follows the
//! same contract as the PostgreSQL backend and is used in tests and offline runs.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::{CollectionSpec, DistanceMetric, VectorStore};

#[derive(Debug, Clone)]
struct Collection {
    spec: CollectionSpec,
    chunks: HashMap<String, Chunk>,
}

/// An in-memory vector store.
///
/// Collections are stored as nested `HashMap`s: collection name → chunk ID → chunk.
/// All operations are async-safe via `tokio::sync::RwLock`; a collection is
/// replaced under a single write lock, so readers never see it half-written.
///
/// # Example
///
/// ```rust,ignore
/// use pdfqa_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.upsert_collection("docs", &spec, &chunks, true).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot = inner_product(a, b);
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn backend(&self) -> &str {
        "in_memory"
    }

    async fn collection_info(&self, name: &str) -> Result<Option<CollectionSpec>> {
        Ok(self.collections.read().await.get(name).map(|c| c.spec.clone()))
    }

    async fn upsert_collection(
        &self,
        name: &str,
        spec: &CollectionSpec,
        chunks: &[Chunk],
        pre_delete: bool,
    ) -> Result<()> {
        spec.ensure_chunks_fit(name, chunks)?;

        let mut collections = self.collections.write().await;
        let mut collection = match collections.get(name) {
            Some(existing) if !pre_delete => {
                existing.spec.ensure_compatible(name, spec)?;
                existing.clone()
            }
            _ => Collection { spec: spec.clone(), chunks: HashMap::new() },
        };
        for chunk in chunks {
            collection.chunks.insert(chunk.id.clone(), chunk.clone());
        }

        debug!(collection = name, chunk_count = collection.chunks.len(), "collection replaced");
        collections.insert(name.to_string(), collection);
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections.write().await.remove(name);
        Ok(())
    }

    async fn nearest(&self, name: &str, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let Some(collection) = collections.get(name) else {
            return Ok(Vec::new());
        };
        if query.len() != collection.spec.dimensions {
            return Err(RagError::DimensionMismatch {
                collection: name.to_string(),
                expected: collection.spec.dimensions,
                actual: query.len(),
            });
        }

        let score: fn(&[f32], &[f32]) -> f32 = match collection.spec.metric {
            DistanceMetric::Cosine => cosine_similarity,
            DistanceMetric::InnerProduct => inner_product,
        };

        let mut scored: Vec<SearchResult> = collection
            .chunks
            .values()
            .map(|chunk| SearchResult {
                score: score(&chunk.embedding, query),
                chunk: chunk.clone(),
            })
            .collect();

        scored.sort_by(|a, b| match b.score.total_cmp(&a.score) {
            Ordering::Equal => a.chunk.id.cmp(&b.chunk.id),
            other => other,
        });
        scored.truncate(k);
        Ok(scored)
    }
}
