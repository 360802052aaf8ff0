//! Provider selection for chat models.
//!
//! The provider is picked once at startup from a configuration string; an
//! unknown selector is a configuration error, never a silent fallback.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ModelError, Result};
use crate::llm::Llm;

/// The supported chat model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProviderKind {
    /// OpenAI chat completions.
    OpenAI,
    /// Google Gemini `generateContent`.
    Gemini,
}

impl LlmProviderKind {
    /// The lowercase selector string, e.g. `"openai"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProviderKind::OpenAI => "openai",
            LlmProviderKind::Gemini => "gemini",
        }
    }

    /// The chat model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProviderKind::OpenAI => "gpt-4o-mini",
            LlmProviderKind::Gemini => "gemini-2.5-flash",
        }
    }
}

impl fmt::Display for LlmProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProviderKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(LlmProviderKind::OpenAI),
            "gemini" => Ok(LlmProviderKind::Gemini),
            other => Err(ModelError::Config(format!(
                "unsupported LLM provider '{other}' (expected 'openai' or 'gemini')"
            ))),
        }
    }
}

/// Everything needed to construct a chat model.
#[derive(Clone, PartialEq)]
pub struct LlmConfig {
    /// Which provider to use.
    pub provider: LlmProviderKind,
    /// API key for the provider.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Optional base URL override (OpenAI-compatible servers, tests).
    pub base_url: Option<String>,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Build the chat model selected by `config`.
///
/// # Errors
///
/// Returns [`ModelError::Config`] if the API key is empty or the provider's
/// feature was not compiled in.
pub fn build_llm(config: &LlmConfig) -> Result<Arc<dyn Llm>> {
    match config.provider {
        #[cfg(feature = "openai")]
        LlmProviderKind::OpenAI => {
            let mut model = crate::openai::OpenAIChatModel::new(&config.api_key, config.timeout)?
                .with_model(&config.model);
            if let Some(base_url) = &config.base_url {
                model = model.with_base_url(base_url);
            }
            Ok(Arc::new(model))
        }
        #[cfg(feature = "gemini")]
        LlmProviderKind::Gemini => {
            let mut model = crate::gemini::GeminiChatModel::new(&config.api_key, config.timeout)?
                .with_model(&config.model);
            if let Some(base_url) = &config.base_url {
                model = model.with_base_url(base_url);
            }
            Ok(Arc::new(model))
        }
        #[allow(unreachable_patterns)]
        other => Err(ModelError::Config(format!(
            "LLM provider '{other}' is not enabled in this build"
        ))),
    }
}
