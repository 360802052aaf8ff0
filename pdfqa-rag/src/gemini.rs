//! Gemini embedding provider using the Generative Language REST API.
//!
//! This module is only available when the `gemini` feature is enabled.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::{EmbeddingProvider, ProviderIdentity, check_dimensions};
use crate::error::{RagError, Result};

/// The default Generative Language API base.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The default model for Gemini embeddings.
pub const DEFAULT_MODEL: &str = "gemini-embedding-001";

/// Output dimensionality requested from the API unless overridden.
pub const DEFAULT_DIMENSIONS: usize = 768;

const PROVIDER: &str = "gemini";

/// Task hint sent with each embedding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Text that will be stored and searched over.
    RetrievalDocument,
    /// A search query.
    RetrievalQuery,
}

/// An [`EmbeddingProvider`] backed by the Gemini embedding API.
///
/// Documents are embedded with [`TaskType::RetrievalDocument`] and queries
/// with [`TaskType::RetrievalQuery`]; both land in the same vector space.
///
/// # Example
///
/// ```rust,ignore
/// use pdfqa_rag::gemini::GeminiEmbeddingProvider;
///
/// let provider = GeminiEmbeddingProvider::new("your-api-key", Duration::from_secs(60))?;
/// let embedding = provider.embed_query("qual foi o faturamento?").await?;
/// ```
pub struct GeminiEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    dimensions: usize,
}

impl GeminiEmbeddingProvider {
    /// Create a new provider using the given API key and the default
    /// `gemini-embedding-001` model at 768 dimensions.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::ConfigError("Gemini API key must not be empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.into(),
            base_url: GEMINI_API_BASE.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Set the model name. A leading `models/` prefix is accepted and dropped.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model = model.strip_prefix("models/").unwrap_or(&model).to_string();
        self
    }

    /// Set the output dimensionality (truncates the embedding vector).
    pub fn with_output_dimensionality(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }

    /// Point the client at a different API base.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request<'a>(&'a self, text: &'a str, task_type: TaskType) -> EmbedContentRequest<'a> {
        EmbedContentRequest {
            model: format!("models/{}", self.model),
            content: Content { parts: vec![Part { text }] },
            task_type,
            output_dimensionality: self.dimensions,
        }
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<R> {
        let url = format!("{}/models/{}:{method}", self.base_url, self.model);
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                RagError::EmbeddingError {
                    provider: PROVIDER.into(),
                    message: if e.is_timeout() {
                        format!("request timed out: {e}")
                    } else {
                        format!("request failed: {e}")
                    },
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(RagError::EmbeddingApi {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                message: detail,
            });
        }

        response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: format!("failed to parse response: {e}"),
            }
        })
    }

    async fn embed_one(&self, text: &str, task_type: TaskType) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), ?task_type, "embedding single text");

        let response: EmbedContentResponse =
            self.post("embedContent", &self.request(text, task_type)).await?;
        let values = response.embedding.values;
        check_dimensions(PROVIDER, self.dimensions, std::slice::from_ref(&values))?;
        Ok(values)
    }
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
    task_type: TaskType,
    output_dimensionality: usize,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct BatchEmbedContentsRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct BatchEmbedContentsResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_one(text, TaskType::RetrievalDocument).await
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = PROVIDER,
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let body = BatchEmbedContentsRequest {
            requests: texts
                .iter()
                .map(|text| self.request(text, TaskType::RetrievalDocument))
                .collect(),
        };
        let response: BatchEmbedContentsResponse = self.post("batchEmbedContents", &body).await?;

        if response.embeddings.len() != texts.len() {
            return Err(RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: format!(
                    "API returned {} embeddings for {} inputs",
                    response.embeddings.len(),
                    texts.len()
                ),
            });
        }

        let vectors: Vec<Vec<f32>> = response.embeddings.into_iter().map(|e| e.values).collect();
        check_dimensions(PROVIDER, self.dimensions, &vectors)?;
        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_one(text, TaskType::RetrievalQuery).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn identity(&self) -> ProviderIdentity {
        ProviderIdentity::new(PROVIDER, &self.model)
    }
}
