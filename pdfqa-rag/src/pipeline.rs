//! Ingestion pipeline.
//!
//! The [`IngestionPipeline`] runs the one-shot load → split → embed → persist
//! workflow by composing an [`EmbeddingProvider`], a [`VectorStore`] and a
//! [`Chunker`].
//!
//! # Example
//!
//! ```rust,ignore
//! use pdfqa_rag::{IngestionPipeline, RagConfig, InMemoryVectorStore};
//!
//! let pipeline = IngestionPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! let report = pipeline.ingest_path(Path::new("document.pdf"), "pdf_documents_openai").await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::RagConfig;
use crate::document::{Chunk, Document};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::loader::loader_for_path;
use crate::vectorstore::{CollectionSpec, VectorStore};

/// Counts reported by a finished ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Collection that was written.
    pub collection: String,
    /// Number of documents (pages) loaded.
    pub documents: usize,
    /// Number of chunks persisted.
    pub chunks: usize,
    /// Dimensionality of the stored vectors.
    pub dimensions: usize,
}

/// The ingestion orchestrator.
///
/// Construct one via [`IngestionPipeline::builder()`]. A run either replaces
/// the target collection completely or leaves it untouched.
pub struct IngestionPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
    pre_delete: bool,
}

impl IngestionPipeline {
    /// Create a new [`IngestionPipelineBuilder`].
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Load the file at `path` and ingest it into `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the file is missing or of an
    /// unsupported type, and propagates loading, embedding and storage errors.
    pub async fn ingest_path(&self, path: &Path, collection: &str) -> Result<IngestReport> {
        let loader = loader_for_path(path)?;
        let documents = loader.load(path).await.map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to load document");
            e
        })?;
        info!(path = %path.display(), pages = documents.len(), "loaded document");

        self.ingest_documents(collection, &documents).await
    }

    /// Split, embed and persist already-loaded documents into `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PipelineError`] if the documents contain no text.
    pub async fn ingest_documents(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<IngestReport> {
        let mut chunks: Vec<Chunk> = documents.iter().flat_map(|d| self.chunker.chunk(d)).collect();
        info!(documents = documents.len(), chunk_count = chunks.len(), "split document");
        if chunks.is_empty() {
            return Err(RagError::PipelineError(
                "document contains no extractable text; nothing to ingest".to_string(),
            ));
        }

        self.embed_chunks(&mut chunks).await?;
        let dimensions = self.embedding_provider.dimensions();
        info!(chunk_count = chunks.len(), dimensions, "embedded chunks");

        let spec = CollectionSpec::new(dimensions, self.embedding_provider.identity());
        self.vector_store
            .upsert_collection(collection, &spec, &chunks, self.pre_delete)
            .await
            .map_err(|e| {
                error!(
                    collection,
                    backend = self.vector_store.backend(),
                    error = %e,
                    "persist failed"
                );
                e
            })?;
        info!(collection, count = chunks.len(), provider = %spec.provider, "persisted collection");

        Ok(IngestReport {
            collection: collection.to_string(),
            documents: documents.len(),
            chunks: chunks.len(),
            dimensions,
        })
    }

    /// Attach embeddings to `chunks`, sending `embed_batch_size` texts per request.
    async fn embed_chunks(&self, chunks: &mut [Chunk]) -> Result<()> {
        for batch in chunks.chunks_mut(self.config.embed_batch_size.max(1)) {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
                error!(first_chunk = %batch[0].id, error = %e, "embedding failed during ingestion");
                e
            })?;

            if embeddings.len() != batch.len() {
                return Err(RagError::EmbeddingError {
                    provider: self.embedding_provider.identity().provider,
                    message: format!(
                        "received {} embeddings for {} chunks",
                        embeddings.len(),
                        batch.len()
                    ),
                });
            }

            for (chunk, embedding) in batch.iter_mut().zip(embeddings) {
                chunk.embedding = embedding;
            }
        }
        Ok(())
    }
}

/// Builder for constructing an [`IngestionPipeline`].
///
/// `embedding_provider` and `vector_store` are required. The chunker defaults
/// to a [`RecursiveChunker`] sized from the config, and pre-delete defaults to on.
#[derive(Default)]
pub struct IngestionPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
    pre_delete: Option<bool>,
}

impl IngestionPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Replace an existing collection (`true`) or add to it (`false`).
    pub fn pre_delete(mut self, pre_delete: bool) -> Self {
        self.pre_delete = Some(pre_delete);
        self
    }

    /// Build the [`IngestionPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<IngestionPipeline> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap))
        });

        Ok(IngestionPipeline {
            config,
            embedding_provider,
            vector_store,
            chunker,
            pre_delete: self.pre_delete.unwrap_or(true),
        })
    }
}
