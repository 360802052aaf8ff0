//! Data types for documents, chunks, and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata key holding the source file identifier.
pub const SOURCE_KEY: &str = "source";
/// Metadata key holding the 1-based page number.
pub const PAGE_KEY: &str = "page";
/// Metadata key holding the chunk's sequence position within its document.
pub const CHUNK_INDEX_KEY: &str = "chunk_index";

/// A source document containing extracted text and metadata.
///
/// One `Document` is produced per PDF page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The extracted text content.
    pub text: String,
    /// Source file identifier (usually the file path).
    pub source: String,
    /// 1-based page number, when the document is a page of a larger file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Additional key-value metadata.
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Metadata inherited by every chunk of this document.
    pub fn chunk_metadata(&self) -> HashMap<String, String> {
        let mut metadata = self.metadata.clone();
        metadata.insert(SOURCE_KEY.to_string(), self.source.clone());
        if let Some(page) = self.page {
            metadata.insert(PAGE_KEY.to_string(), page.to_string());
        }
        metadata
    }
}

/// A segment of a [`Document`] with its vector embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk, `{document_id}_{index}`.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text. Empty until embedded.
    pub embedding: Vec<f32>,
    /// Metadata inherited from the parent document plus `chunk_index`.
    pub metadata: HashMap<String, String>,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Sequence position within the parent document.
    pub index: usize,
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}
