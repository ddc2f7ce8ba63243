//! Explicit configuration structs.
//!
//! Credentials and tunables are passed at construction time rather than
//! read from ambient process globals, so each driver or service owns its
//! configuration for its whole lifecycle.

use std::time::Duration;

use crate::error::{RagError, Result};

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";

/// Default dimensionality of [`DEFAULT_EMBED_MODEL`].
pub const DEFAULT_DIMENSIONS: usize = 1536;

/// Default chat model for answer generation.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Default per-request timeout for OpenAI calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries for transient API failures.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration shared by the OpenAI embedding and generation clients.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key used as a bearer token.
    pub api_key: String,
    /// Embedding model name.
    pub embed_model: String,
    /// Embedding dimensionality; must match what the index was created with.
    pub dimensions: usize,
    /// Chat model name used for answer generation.
    pub chat_model: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum retries on rate-limit or server errors.
    pub max_retries: u32,
}

impl OpenAiConfig {
    /// Create a configuration with default models and limits.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Config("OpenAI API key must not be empty".to_string()));
        }
        Ok(Self {
            api_key,
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the embedding model and its dimensionality.
    pub fn with_embed_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.embed_model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Set the chat model used for generation.
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retries on transient failures.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(OpenAiConfig::new(""), Err(RagError::Config(_))));
    }

    #[test]
    fn defaults_match_observed_configuration() {
        let config = OpenAiConfig::new("sk-test").unwrap();
        assert_eq!(config.embed_model, "text-embedding-3-small");
        assert_eq!(config.dimensions, 1536);
        assert_eq!(config.chat_model, "gpt-4o-mini");
    }
}
