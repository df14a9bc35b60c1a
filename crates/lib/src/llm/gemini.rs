//! Gemini API client (`models/{model}:generateContent`).

use crate::config::{self, GeminiConfig};
use crate::llm::{LlmBackend, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini generateContent endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    generation_config: GenerationConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.trim().to_string(),
            api_key: config::non_empty(config.api_key.as_deref()).map(str::to_string),
            generation_config: GenerationConfig {
                temperature: Some(config.temperature),
                max_output_tokens: Some(config.max_output_tokens),
            },
            client: reqwest::Client::new(),
        }
    }

    /// POST models/{model}:generateContent. The key travels in the `x-goog-api-key` header.
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let res = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }
        Ok(res.json().await?)
    }

    fn user_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: Some(self.generation_config.clone()),
        }
    }
}

#[async_trait]
impl LlmBackend for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = self.user_request(prompt);
        let response = self.generate_content(&request).await?;
        response
            .text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text)
    }
}
