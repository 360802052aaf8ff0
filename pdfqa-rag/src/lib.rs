//! # pdfqa-rag
//!
//! Retrieval-augmented answering over a single ingested document.
//!
//! ## Overview
//!
//! - [`DocumentLoader`] - turns a PDF (feature `pdf`) or text file into [`Document`]s
//! - [`RecursiveChunker`] - bounded, overlapping, separator-aware chunks
//! - [`EmbeddingProvider`] - OpenAI (feature `openai`) and Gemini (feature `gemini`) embedders
//! - [`VectorStore`] - [`InMemoryVectorStore`] and PostgreSQL/pgvector (feature `pgvector`)
//! - [`IngestionPipeline`] - load → split → embed → persist
//! - [`Retriever`] - top-k search that degrades to "no context" on failure
//! - [`ContextFormatter`] - numbered, score-annotated context block
//! - [`GroundedAnswerer`] - strict prompt + language model, refusing without context
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pdfqa_rag::{GroundedAnswerer, QuestionAnswerer, RagConfig, Retriever};
//!
//! let config = RagConfig::default();
//! let retriever = Retriever::new(embedder, store, "pdf_documents_openai", &config);
//! let answerer = GroundedAnswerer::new(retriever, llm, &config);
//! println!("{}", answerer.answer("Qual foi o faturamento da empresa?").await?);
//! ```

pub mod answer;
pub mod chunking;
pub mod config;
pub mod context;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod loader;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod retriever;
pub mod vectorstore;

#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "pgvector")]
pub mod pgvector;

pub use answer::{GroundedAnswerer, QuestionAnswerer};
pub use chunking::{Chunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use context::{ContextFormatter, NO_CONTEXT, format_context};
pub use document::{Chunk, Document, SearchResult};
pub use embedding::{EmbeddingProvider, ProviderIdentity};
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorStore;
#[cfg(feature = "pdf")]
pub use loader::PdfLoader;
pub use loader::{DocumentLoader, TextLoader, loader_for_path};
pub use pipeline::{IngestReport, IngestionPipeline, IngestionPipelineBuilder};
pub use prompt::{REFUSAL, render_prompt};
pub use provider::{
    EmbedderConfig, EmbeddingProviderKind, build_embedding_provider, collection_name,
};
pub use retriever::{Retrieval, Retriever};
pub use vectorstore::{CollectionSpec, DistanceMetric, VectorStore};
