//! Grounded question answering.

use std::sync::Arc;

use async_trait::async_trait;
use pdfqa_model::{GenerateRequest, Llm};
use tracing::{debug, error, info};

use crate::config::RagConfig;
use crate::context::ContextFormatter;
use crate::error::{RagError, Result};
use crate::prompt::{REFUSAL, render_prompt};
use crate::retriever::{Retrieval, Retriever};

/// Answers a single question with a single string.
///
/// This is the seam the command-line shell calls into.
#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    /// Answer `question`. A refusal is a normal answer, not an error.
    async fn answer(&self, question: &str) -> Result<String>;
}

/// Answers questions strictly from retrieved passages.
///
/// Each call performs one query embedding, one index search and at most one
/// language-model call, in that order. The model output is returned as-is.
///
/// # Example
///
/// ```rust,ignore
/// use pdfqa_rag::{GroundedAnswerer, QuestionAnswerer};
///
/// let answerer = GroundedAnswerer::new(retriever, llm, &config);
/// let answer = answerer.answer("Qual foi o faturamento?").await?;
/// ```
pub struct GroundedAnswerer {
    retriever: Retriever,
    formatter: ContextFormatter,
    llm: Arc<dyn Llm>,
    temperature: f32,
    refuse_without_context: bool,
}

impl GroundedAnswerer {
    /// Create an answerer with temperature `0.0`.
    pub fn new(retriever: Retriever, llm: Arc<dyn Llm>, config: &RagConfig) -> Self {
        Self {
            retriever,
            formatter: ContextFormatter::new(config.max_context_chars),
            llm,
            temperature: 0.0,
            refuse_without_context: true,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Choose whether an empty retrieval returns [`REFUSAL`] directly
    /// (the default) or still goes through the model with the empty-context block.
    pub fn with_refuse_without_context(mut self, refuse: bool) -> Self {
        self.refuse_without_context = refuse;
        self
    }

    /// The retriever backing this answerer.
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Retrieve passages and render the full prompt for `question`.
    pub async fn build_prompt(&self, question: &str) -> (Retrieval, String) {
        let retrieval = self.retriever.retrieve(question).await;
        let context = self.formatter.format(&retrieval);
        (retrieval, render_prompt(&context, question))
    }
}

#[async_trait]
impl QuestionAnswerer for GroundedAnswerer {
    async fn answer(&self, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(RagError::PipelineError("question must not be empty".into()));
        }

        let (retrieval, prompt) = self.build_prompt(question).await;
        if retrieval.results().is_empty() && self.refuse_without_context {
            info!(degraded = retrieval.is_degraded(), "no context retrieved, refusing");
            return Ok(REFUSAL.to_string());
        }

        debug!(
            passages = retrieval.results().len(),
            prompt_len = prompt.len(),
            model = self.llm.name(),
            "invoking language model"
        );

        let request = GenerateRequest::new(prompt, self.temperature);
        self.llm.generate(&request).await.map_err(|e| {
            error!(provider = self.llm.provider(), error = %e, "language model call failed");
            RagError::Model(e)
        })
    }
}
