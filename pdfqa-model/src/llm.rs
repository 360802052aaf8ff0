//! The chat-model capability trait.

use async_trait::async_trait;

use crate::error::Result;

/// A single non-streaming generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// The fully rendered prompt, sent as one user message.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
}

impl GenerateRequest {
    /// Create a request with the given prompt and temperature.
    pub fn new(prompt: impl Into<String>, temperature: f32) -> Self {
        Self { prompt: prompt.into(), temperature }
    }
}

/// A language model that turns a prompt into text.
///
/// Implementations are stateless per call and safe to share across tasks,
/// so one client handle can serve concurrent questions.
///
/// # Example
///
/// ```rust,ignore
/// use pdfqa_model::{GenerateRequest, Llm};
///
/// let text = model.generate(&GenerateRequest::new("Say hi", 0.0)).await?;
/// ```
#[async_trait]
pub trait Llm: Send + Sync {
    /// Provider name, e.g. `"openai"`.
    fn provider(&self) -> &str;

    /// Model identifier, e.g. `"gpt-4o-mini"`.
    fn name(&self) -> &str;

    /// Generate a completion and return the raw text.
    ///
    /// An empty completion is reported as
    /// [`ModelError::EmptyResponse`](crate::ModelError::EmptyResponse), never as `Ok("")`.
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;
}
