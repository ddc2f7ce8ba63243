//! Answer generation from retrieved context.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::OpenAiConfig;
use crate::error::{RagError, Result};
use crate::openai::ErrorResponse;
use crate::retry::send_with_retry;

/// The default OpenAI chat completions endpoint.
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// System instruction constraining answers to the supplied context.
const SYSTEM_PROMPT: &str = "You are a knowledgeable and reliable Financial Assistant designed to help users \
with finance-related questions. Use the provided context to generate accurate, \
clear, and concise answers. Your response should be based strictly on the information \
in the context. If the answer is not available in the context, say that you don't know — \
do not make up answers.\n\n\
Respond in a professional tone suitable for investors, analysts, and business users. \
Limit your response to three sentences.";

/// A collaborator that synthesizes an answer from retrieved context.
///
/// Implementations are constrained to answer only from the supplied
/// context and to decline when the answer is not derivable from it.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an answer to `question` grounded in `context`.
    async fn generate(&self, context: &[String], question: &str) -> Result<String>;
}

/// A [`Generator`] backed by the OpenAI chat completions API.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_retries: u32,
    endpoint: String,
}

impl OpenAiGenerator {
    /// Create a generator from the given configuration.
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
            model: config.chat_model.clone(),
            max_retries: config.max_retries,
            endpoint: OPENAI_CHAT_URL.to_string(),
        })
    }

    /// Override the API endpoint (used to point tests at a local mock).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn gen_err(message: String) -> RagError {
        RagError::Generation { provider: "OpenAI".to_string(), message }
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(&self, context: &[String], question: &str) -> Result<String> {
        debug!(
            provider = "OpenAI",
            model = %self.model,
            context_chunks = context.len(),
            "generating answer"
        );

        let system = if context.is_empty() {
            SYSTEM_PROMPT.to_string()
        } else {
            format!("{SYSTEM_PROMPT}\n\nContext:\n{}", context.join("\n\n"))
        };

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &system },
                ChatMessage { role: "user", content: question },
            ],
        };

        let response = send_with_retry(
            self.max_retries,
            || {
                self.client
                    .post(&self.endpoint)
                    .bearer_auth(&self.api_key)
                    .json(&request_body)
                    .send()
            },
            Self::gen_err,
        )
        .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "OpenAI", %status, "API error");
            return Err(Self::gen_err(format!("API returned {status}: {detail}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| Self::gen_err(format!("failed to parse response: {e}")))?;

        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Self::gen_err("API returned no choices".to_string()))
    }
}
