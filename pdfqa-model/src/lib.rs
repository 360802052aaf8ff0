//! # pdfqa-model
//!
//! Chat model integrations used by the pdfqa grounded answerer.
//!
//! ## Overview
//!
//! - [`Llm`] - the capability trait: one prompt in, raw text out
//! - [`openai::OpenAIChatModel`] - OpenAI chat completions (feature `openai`)
//! - [`gemini::GeminiChatModel`] - Gemini `generateContent` (feature `gemini`)
//! - [`MockLlm`] - scripted model for tests
//!
//! Providers are selected once at startup with [`build_llm`] from an
//! [`LlmConfig`].
//!
//! ## Supported Models
//!
//! | Provider | Default model |
//! |----------|---------------|
//! | `openai` | `gpt-4o-mini` |
//! | `gemini` | `gemini-2.5-flash` |

pub mod error;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod llm;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;
pub mod provider;

pub use error::{ModelError, Result};
pub use llm::{GenerateRequest, Llm};
pub use mock::MockLlm;
pub use provider::{LlmConfig, LlmProviderKind, build_llm};
