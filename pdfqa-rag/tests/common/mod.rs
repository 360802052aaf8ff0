//! Shared test doubles.

#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pdfqa_rag::embedding::{EmbeddingProvider, ProviderIdentity};
use pdfqa_rag::error::{RagError, Result};

/// Bag-of-words embedder: each lowercase word is hashed into one of `dims`
/// buckets, and the vector is L2-normalized. Texts sharing words score high.
pub struct HashEmbedder {
    dims: usize,
    identity: ProviderIdentity,
    batch_calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self::with_identity(dims, ProviderIdentity::new("test", "hash-embedder"))
    }

    pub fn with_identity(dims: usize, identity: ProviderIdentity) -> Self {
        Self { dims, identity, batch_calls: AtomicUsize::new(0) }
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| w.len() > 2) {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            v[(hasher.finish() as usize) % self.dims] += 1.0;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn identity(&self) -> ProviderIdentity {
        self.identity.clone()
    }
}

/// An embedder whose every call fails as if the provider were down.
pub struct FailingEmbedder {
    pub dims: usize,
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::EmbeddingError {
            provider: "test".into(),
            message: "service unavailable".into(),
        })
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn identity(&self) -> ProviderIdentity {
        ProviderIdentity::new("test", "hash-embedder")
    }
}
