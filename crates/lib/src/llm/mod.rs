//! LLM abstraction and Gemini client.
//!
//! The relay only needs single-turn text completion, so the backend trait is one method.

mod gemini;

use async_trait::async_trait;

pub use gemini::{
    Candidate, Content, GeminiClient, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, Part,
};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("gemini api key not configured")]
    NotConfigured,
    #[error("gemini request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("gemini api error: {status} {body}")]
    Api { status: u16, body: String },
    #[error("gemini returned no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e.without_url())
    }
}

/// Text-completion backend: prompt in, generated text out.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
