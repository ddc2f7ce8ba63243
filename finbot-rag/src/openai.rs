//! OpenAI embedding provider using the OpenAI embeddings API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::OpenAiConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::retry::send_with_retry;

/// The default OpenAI embeddings API endpoint.
const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
///
/// Calls `/v1/embeddings` directly via `reqwest` with the configured
/// timeout, retrying transient failures with bounded exponential backoff.
///
/// # Example
///
/// ```rust,ignore
/// use finbot_rag::{OpenAiConfig, OpenAiEmbedding};
///
/// let config = OpenAiConfig::new("sk-...")?;
/// let provider = OpenAiEmbedding::new(&config)?;
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), 1536);
/// ```
pub struct OpenAiEmbedding {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
    max_retries: u32,
    endpoint: String,
}

impl OpenAiEmbedding {
    /// Create a provider from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.embed_model.clone(),
            dimensions: config.dimensions,
            max_retries: config.max_retries,
            endpoint: OPENAI_EMBEDDINGS_URL.to_string(),
        })
    }

    /// Override the API endpoint (used to point tests at a local mock).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn embed_err(message: String) -> RagError {
        RagError::Embedding { provider: "OpenAI".to_string(), message }
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: ErrorDetail,
}

#[derive(Deserialize)]
pub(crate) struct ErrorDetail {
    pub(crate) message: String,
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| Self::embed_err("API returned empty response".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "OpenAI", batch_size = texts.len(), model = %self.model, "embedding batch");

        let request_body =
            EmbeddingRequest { model: &self.model, input: texts.to_vec() };

        let response = send_with_retry(
            self.max_retries,
            || {
                self.client
                    .post(&self.endpoint)
                    .bearer_auth(&self.api_key)
                    .json(&request_body)
                    .send()
            },
            Self::embed_err,
        )
        .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "OpenAI", %status, "API error");
            return Err(Self::embed_err(format!("API returned {status}: {detail}")));
        }

        let embedding_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Self::embed_err(format!("failed to parse response: {e}")))?;

        if embedding_response.data.len() != texts.len() {
            return Err(Self::embed_err(format!(
                "API returned {} embeddings for {} inputs",
                embedding_response.data.len(),
                texts.len()
            )));
        }

        Ok(embedding_response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_tag(&self) -> &str {
        &self.model
    }
}
