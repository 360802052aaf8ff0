//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`RecursiveChunker`], which
//! cuts text into bounded, overlapping windows and prefers to end each window
//! on the largest available separator: paragraph break, then line break, then
//! word break, and only then a raw character cut.
//!
//! Lengths are counted in `char`s, never bytes, so accented text is never
//! split inside a code point.

use crate::document::{CHUNK_INDEX_KEY, Chunk, Document};

/// Separators tried in order of preference.
pub const DEFAULT_SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no embeddings.
/// Embeddings are attached later by the ingestion pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    /// Each returned chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into windows of at most `chunk_size` characters.
///
/// Every chunk after the first starts with the last `chunk_overlap`
/// characters of its predecessor, so dropping that prefix from each chunk and
/// concatenating gives back the original text exactly.
///
/// # Example
///
/// ```rust,ignore
/// use pdfqa_rag::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(1000, 150);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: number of characters repeated between consecutive chunks
    ///
    /// A zero `chunk_size` is treated as 1 and an overlap that is not smaller
    /// than the chunk size is clamped to `chunk_size - 1`; use
    /// [`RagConfig::builder`](crate::RagConfig::builder) to reject such values up front.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the separator list (most preferred first).
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators =
            separators.into_iter().map(Into::into).filter(|s: &String| !s.is_empty()).collect();
        self
    }

    /// Maximum chunk length in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap between consecutive chunks in characters.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split raw text into chunk strings.
    pub fn split_text<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.split_spans(text).into_iter().map(|(start, end)| &text[start..end]).collect()
    }

    /// Compute the byte spans of each chunk.
    fn split_spans(&self, text: &str) -> Vec<(usize, usize)> {
        // bounds[i] is the byte offset of char i; the final entry is text.len().
        let bounds: Vec<usize> =
            text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let total = bounds.len() - 1;
        if total == 0 {
            return Vec::new();
        }

        let mut spans = Vec::new();
        let mut start = 0;
        loop {
            let limit = start + self.chunk_size;
            if limit >= total {
                spans.push((bounds[start], text.len()));
                break;
            }

            // A chunk must reach past the overlap it will hand to its successor.
            let min_end = start + self.chunk_overlap + 1;
            let end = self.find_break(text, &bounds, start, min_end, limit).unwrap_or(limit);
            spans.push((bounds[start], bounds[end]));
            start = end - self.chunk_overlap;
        }
        spans
    }

    /// Find the char index just after the last occurrence of the most
    /// preferred separator that ends inside `[min_end, limit]`.
    fn find_break(
        &self,
        text: &str,
        bounds: &[usize],
        start: usize,
        min_end: usize,
        limit: usize,
    ) -> Option<usize> {
        let window_start = bounds[start];
        let window = &text[window_start..bounds[limit]];

        for separator in &self.separators {
            for (pos, matched) in window.rmatch_indices(separator.as_str()) {
                let break_byte = window_start + pos + matched.len();
                let Ok(break_char) = bounds.binary_search(&break_byte) else {
                    continue;
                };
                if break_char >= min_end {
                    return Some(break_char);
                }
                // Matches only move left from here.
                break;
            }
        }
        None
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let base_metadata = document.chunk_metadata();
        self.split_text(&document.text)
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let mut metadata = base_metadata.clone();
                metadata.insert(CHUNK_INDEX_KEY.to_string(), i.to_string());
                Chunk {
                    id: format!("{}_{i}", document.id),
                    text: text.to_string(),
                    embedding: Vec::new(),
                    metadata,
                    document_id: document.id.clone(),
                    index: i,
                }
            })
            .collect()
    }
}
