//! Embedding provider selection and collection naming.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The supported embedding providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingProviderKind {
    /// OpenAI `/v1/embeddings`.
    OpenAI,
    /// Gemini `embedContent`.
    Gemini,
}

impl EmbeddingProviderKind {
    /// The lowercase selector string, e.g. `"openai"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingProviderKind::OpenAI => "openai",
            EmbeddingProviderKind::Gemini => "gemini",
        }
    }

    /// The embedding model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            EmbeddingProviderKind::OpenAI => "text-embedding-3-small",
            EmbeddingProviderKind::Gemini => "gemini-embedding-001",
        }
    }
}

impl fmt::Display for EmbeddingProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmbeddingProviderKind {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(EmbeddingProviderKind::OpenAI),
            "gemini" => Ok(EmbeddingProviderKind::Gemini),
            other => Err(RagError::ConfigError(format!(
                "unsupported embeddings provider '{other}' (expected 'openai' or 'gemini')"
            ))),
        }
    }
}

/// The persisted collection name: `{base}_{provider}`.
///
/// Vectors from different providers never share a collection.
pub fn collection_name(base: &str, provider: EmbeddingProviderKind) -> String {
    format!("{base}_{provider}")
}

/// Everything needed to construct an embedding provider.
#[derive(Clone, PartialEq)]
pub struct EmbedderConfig {
    /// Which provider to use.
    pub provider: EmbeddingProviderKind,
    /// API key for the provider.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Output dimensionality override; `None` keeps the provider default.
    pub dimensions: Option<usize>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Optional base URL override.
    pub base_url: Option<String>,
}

impl fmt::Debug for EmbedderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedderConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Build the embedding provider selected by `config`.
///
/// # Errors
///
/// Returns [`RagError::ConfigError`] if the API key is empty or the provider's
/// feature was not compiled in.
pub fn build_embedding_provider(config: &EmbedderConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider {
        #[cfg(feature = "openai")]
        EmbeddingProviderKind::OpenAI => {
            let mut provider =
                crate::openai::OpenAIEmbeddingProvider::new(&config.api_key, config.timeout)?
                    .with_model(&config.model);
            if let Some(dims) = config.dimensions {
                provider = provider.with_dimensions(dims);
            }
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url);
            }
            Ok(Arc::new(provider))
        }
        #[cfg(feature = "gemini")]
        EmbeddingProviderKind::Gemini => {
            let mut provider =
                crate::gemini::GeminiEmbeddingProvider::new(&config.api_key, config.timeout)?
                    .with_model(&config.model);
            if let Some(dims) = config.dimensions {
                provider = provider.with_output_dimensionality(dims);
            }
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url);
            }
            Ok(Arc::new(provider))
        }
        #[allow(unreachable_patterns)]
        other => Err(RagError::ConfigError(format!(
            "embeddings provider '{other}' is not enabled in this build"
        ))),
    }
}
