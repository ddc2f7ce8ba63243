//! Query service: embed → retrieve → generate.

use std::sync::Arc;

use tracing::{debug, info};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::Generator;
use crate::vectorstore::VectorStore;

/// Default number of chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 3;

/// Configuration for the query path.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Name of the vector index to query.
    pub index_name: String,
    /// Number of nearest chunks retrieved as context.
    pub top_k: usize,
}

impl QueryConfig {
    /// Create a config targeting the named index with the default `top_k`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the index name is empty.
    pub fn new(index_name: impl Into<String>) -> Result<Self> {
        let index_name = index_name.into();
        if index_name.is_empty() {
            return Err(RagError::Config("index name must not be empty".to_string()));
        }
        Ok(Self { index_name, top_k: DEFAULT_TOP_K })
    }

    /// Set the number of retrieved chunks.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `top_k` is zero.
    pub fn with_top_k(mut self, top_k: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        self.top_k = top_k;
        Ok(self)
    }
}

/// Answers free-text questions from the indexed corpus.
///
/// The embedding configuration must match the one used at ingestion time;
/// the service enforces this by comparing the index's stored
/// dimensionality against the provider's before searching.
pub struct QueryService {
    config: QueryConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    generator: Arc<dyn Generator>,
}

impl QueryService {
    /// Create a query service over the given collaborators.
    pub fn new(
        config: QueryConfig,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self { config, embedding_provider, vector_store, generator }
    }

    /// Answer a question from the indexed corpus.
    ///
    /// A decline-style answer ("I don't know ...") is a normal success;
    /// only collaborator failures produce errors.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the question is empty or the index
    /// was built with a different embedding dimensionality,
    /// [`RagError::Index`] if the index is missing or the search fails,
    /// and [`RagError::Embedding`] / [`RagError::Generation`] for
    /// collaborator failures.
    pub async fn answer(&self, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(RagError::Config("query must not be empty".to_string()));
        }

        self.check_embedding_parity().await?;

        let query_embedding = self.embedding_provider.embed(question).await?;
        let results = self
            .vector_store
            .search(&self.config.index_name, &query_embedding, self.config.top_k)
            .await?;

        debug!(retrieved = results.len(), top_k = self.config.top_k, "retrieved context");

        let context: Vec<String> = results.into_iter().map(|r| r.chunk.content).collect();
        let answer = self.generator.generate(&context, question).await?;

        info!(question_len = question.len(), answer_len = answer.len(), "answered query");
        Ok(answer)
    }

    /// Ensure the index was built with the same embedding dimensionality
    /// this service queries with.
    async fn check_embedding_parity(&self) -> Result<()> {
        let index = &self.config.index_name;
        match self.vector_store.index_dimensions(index).await? {
            Some(stored) if stored == self.embedding_provider.dimensions() => Ok(()),
            Some(stored) => Err(RagError::Config(format!(
                "index '{index}' stores {stored}-dimensional vectors but embedding model '{}' \
                 produces {}; re-ingest with a matching model",
                self.embedding_provider.model_tag(),
                self.embedding_provider.dimensions()
            ))),
            None => Err(RagError::Index {
                backend: "unknown".to_string(),
                message: format!("index '{index}' does not exist; run ingestion first"),
            }),
        }
    }
}
