//! Mock LLM for testing.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{ModelError, Result};
use crate::llm::{GenerateRequest, Llm};

/// A scripted [`Llm`] that replays queued replies and records every request.
///
/// When the queue is empty the fallback reply is returned; when no fallback
/// is set either, the call fails with [`ModelError::EmptyResponse`].
#[derive(Debug, Default)]
pub struct MockLlm {
    replies: Mutex<VecDeque<Result<String>>>,
    fallback: Option<String>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockLlm {
    /// Create a mock with no scripted replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that always answers `reply`.
    pub fn always(reply: impl Into<String>) -> Self {
        Self { fallback: Some(reply.into()), ..Self::default() }
    }

    /// Queue a successful reply.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.replies.get_mut().push_back(Ok(reply.into()));
        self
    }

    /// Queue a failure.
    pub fn with_error(mut self, error: ModelError) -> Self {
        self.replies.get_mut().push_back(Err(error));
        self
    }

    /// All requests received so far, in order.
    pub async fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of calls made so far.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn provider(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "mock-llm"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        self.requests.lock().await.push(request.clone());
        if let Some(reply) = self.replies.lock().await.pop_front() {
            return reply;
        }
        self.fallback.clone().ok_or_else(|| ModelError::EmptyResponse { provider: "mock".into() })
    }
}
