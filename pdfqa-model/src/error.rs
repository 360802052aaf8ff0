//! Error types for the `pdfqa-model` crate.

use thiserror::Error;

/// Errors that can occur while talking to a chat model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The model could not be configured (missing key, unknown provider, ...).
    #[error("Model configuration error: {0}")]
    Config(String),

    /// The request never produced an HTTP response.
    #[error("Model request failed ({provider}): {message}")]
    Request {
        /// The provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The provider answered with a non-success status.
    #[error("Model API error ({provider}, status {status}): {message}")]
    Api {
        /// The provider that produced the error.
        provider: String,
        /// HTTP status code.
        status: u16,
        /// Error detail extracted from the response body.
        message: String,
    },

    /// The request did not finish within the configured timeout.
    #[error("Model request timed out ({provider})")]
    Timeout {
        /// The provider that timed out.
        provider: String,
    },

    /// The provider answered successfully but produced no text.
    #[error("Model returned an empty response ({provider})")]
    EmptyResponse {
        /// The provider that produced the empty response.
        provider: String,
    },
}

impl ModelError {
    /// Whether retrying the same request later could succeed.
    ///
    /// Authentication failures (401/403) and configuration errors are permanent;
    /// timeouts, transport failures, rate limits and server errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ModelError::Config(_) => false,
            ModelError::Api { status, .. } => *status == 429 || *status >= 500,
            ModelError::Request { .. } | ModelError::Timeout { .. } => true,
            ModelError::EmptyResponse { .. } => true,
        }
    }
}

/// A convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
