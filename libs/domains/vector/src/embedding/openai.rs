use std::time::Duration;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse_or};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::EmbeddingProvider;
use crate::error::{VectorError, VectorResult};
use crate::models::{EmbeddingModel, EmbeddingResult};

/// Configuration for an OpenAI-compatible `/embeddings` endpoint
///
/// Works against OpenAI itself, Ollama, vLLM, text-embeddings-inference and
/// anything else speaking the same request shape.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// `EMBEDDING_BASE_URL`, `EMBEDDING_API_KEY` (falls back to `OPENAI_API_KEY`)
/// and `EMBEDDING_TIMEOUT_SECS`
impl FromEnv for OpenAIConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: env_or_default("EMBEDDING_BASE_URL", "http://localhost:11434/v1"),
            api_key: env_optional("EMBEDDING_API_KEY").or_else(|| env_optional("OPENAI_API_KEY")),
            timeout_secs: env_parse_or("EMBEDDING_TIMEOUT_SECS", 30)?,
        })
    }
}

/// Embeddings over HTTP
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> VectorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> VectorResult<Self> {
        Self::new(OpenAIConfig::from_env()?)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<EmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    #[serde(default)]
    total_tokens: u32,
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    #[instrument(skip(self, text), fields(model = model.model_name(), chars = text.len()))]
    async fn embed(&self, model: &EmbeddingModel, text: &str) -> VectorResult<EmbeddingResult> {
        let request = EmbeddingRequest {
            model: model.model_name(),
            input: vec![text],
        };

        let mut builder = self.client.post(self.config.endpoint()).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VectorError::Embedding(format!(
                "embedding API error ({}): {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await?;
        let tokens_used = embedding_response
            .usage
            .map(|u| u.total_tokens)
            .unwrap_or_default();

        let data = embedding_response
            .data
            .into_iter()
            .min_by_key(|d| d.index)
            .ok_or_else(|| VectorError::Embedding("No embedding returned".to_string()))?;

        if data.embedding.is_empty() {
            return Err(VectorError::Embedding("Empty embedding returned".to_string()));
        }

        debug!(dimension = data.embedding.len(), tokens_used, "Embedding generated");

        let mut result = EmbeddingResult::new(data.embedding);
        result.tokens_used = tokens_used;
        Ok(result)
    }
}
