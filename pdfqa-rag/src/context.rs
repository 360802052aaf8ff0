//! Rendering retrieved passages into the prompt's context block.

use tracing::debug;

use crate::document::SearchResult;
use crate::retriever::Retrieval;

/// Context block used when nothing relevant was retrieved.
pub const NO_CONTEXT: &str = "Nenhum documento relevante encontrado.";

/// Renders retrieval results as numbered, score-annotated segments.
///
/// Segments keep the retrieval order and are separated by a blank line:
///
/// ```text
/// Documento 1 (relevância: 0.873):
/// <chunk text>
///
/// Documento 2 (relevância: 0.802):
/// <chunk text>
/// ```
///
/// Whole segments are added until `max_chars` would be exceeded; a first
/// segment that is too long on its own is cut to fit.
#[derive(Debug, Clone)]
pub struct ContextFormatter {
    max_chars: usize,
}

impl ContextFormatter {
    /// Create a formatter with a character budget.
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars: max_chars.max(NO_CONTEXT.chars().count()) }
    }

    /// Format a [`Retrieval`]; anything without passages becomes [`NO_CONTEXT`].
    pub fn format(&self, retrieval: &Retrieval) -> String {
        self.format_results(retrieval.results())
    }

    /// Format a ranked list of results.
    pub fn format_results(&self, results: &[SearchResult]) -> String {
        if results.is_empty() {
            return NO_CONTEXT.to_string();
        }

        let mut block = String::new();
        let mut used = 0;
        for (i, result) in results.iter().enumerate() {
            let segment = segment(i + 1, result);
            let separator = if i == 0 { 0 } else { 1 };
            let len = segment.chars().count();

            if used + separator + len > self.max_chars {
                if i == 0 {
                    block = segment.chars().take(self.max_chars).collect();
                }
                debug!(
                    kept = i.max(1),
                    dropped = results.len() - i.max(1),
                    "context budget reached"
                );
                break;
            }

            if i > 0 {
                block.push('\n');
            }
            block.push_str(&segment);
            used += separator + len;
        }
        block
    }
}

impl Default for ContextFormatter {
    fn default() -> Self {
        Self::new(crate::config::RagConfig::default().max_context_chars)
    }
}

fn segment(position: usize, result: &SearchResult) -> String {
    format!("Documento {position} (relevância: {:.3}):\n{}\n", result.score, result.chunk.text)
}

/// Format results with the default budget.
pub fn format_context(results: &[SearchResult]) -> String {
    ContextFormatter::default().format_results(results)
}
