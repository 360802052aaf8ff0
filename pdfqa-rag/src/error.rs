//! Error types for the `pdfqa-rag` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The source document could not be loaded.
    #[error("Document error ({source_path}): {message}")]
    DocumentError {
        /// The path that failed to load.
        source_path: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The embedding provider answered with a non-success status.
    #[error("Embedding error ({provider}): API returned {status}: {message}")]
    EmbeddingApi {
        /// The embedding provider that produced the error.
        provider: String,
        /// HTTP status code.
        status: u16,
        /// Error detail extracted from the response body.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector's length does not match the collection's dimensionality.
    #[error(
        "Dimension mismatch in collection '{collection}': expected {expected}, got {actual}"
    )]
    DimensionMismatch {
        /// The collection being written or queried.
        collection: String,
        /// Dimensionality recorded for the collection.
        expected: usize,
        /// Dimensionality of the offending vector.
        actual: usize,
    },

    /// The collection was built by a different embedding provider or metric.
    #[error("Provider mismatch in '{collection}': built with {expected}, queried with {actual}")]
    ProviderMismatch {
        /// The collection being queried.
        collection: String,
        /// The provider identity recorded at ingestion time.
        expected: String,
        /// The provider identity of the active embedder.
        actual: String,
    },

    /// A network operation exceeded its time budget.
    #[error("Timed out after {seconds}s during {operation}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The budget that was exceeded.
        seconds: u64,
    },

    /// An error in the ingestion orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// The answering model failed.
    #[error(transparent)]
    Model(#[from] pdfqa_model::ModelError),
}

impl RagError {
    /// Whether the failure is a transient I/O condition rather than a
    /// configuration problem.
    ///
    /// Rejected credentials (401/403) and other client errors are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            RagError::EmbeddingApi { status, .. } => *status == 429 || *status >= 500,
            RagError::EmbeddingError { .. }
            | RagError::VectorStoreError { .. }
            | RagError::Timeout { .. } => true,
            RagError::Model(e) => e.is_transient(),
            RagError::ConfigError(_)
            | RagError::DocumentError { .. }
            | RagError::DimensionMismatch { .. }
            | RagError::ProviderMismatch { .. }
            | RagError::PipelineError(_) => false,
        }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> RagError {
        RagError::EmbeddingApi { provider: "openai".into(), status, message: "detail".into() }
    }

    #[test]
    fn rejected_credentials_are_permanent() {
        assert!(!api(401).is_transient());
        assert!(!api(403).is_transient());
        assert!(!api(400).is_transient());
    }

    #[test]
    fn rate_limits_server_errors_and_timeouts_are_transient() {
        assert!(api(429).is_transient());
        assert!(api(503).is_transient());
        assert!(RagError::Timeout { operation: "embed".into(), seconds: 30 }.is_transient());
    }

    #[test]
    fn model_classification_is_preserved() {
        let unauthorized = pdfqa_model::ModelError::Api {
            provider: "OpenAI".into(),
            status: 401,
            message: "bad key".into(),
        };
        assert!(!RagError::from(unauthorized).is_transient());
    }
}
