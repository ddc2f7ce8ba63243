//! Ingestion driver.
//!
//! [`Ingestor`] orchestrates the one-shot write path: load a directory,
//! narrow metadata, chunk, embed, and upsert into the vector index.
//! Per-document failures are collected into the [`IngestionReport`]
//! rather than aborting the batch, so one bad file never costs the run.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use finbot_rag::{Ingestor, IngestConfig, PdfDirectoryLoader, RecursiveCharacterChunker};
//!
//! let ingestor = Ingestor::builder()
//!     .config(IngestConfig::new("finance-bot")?)
//!     .loader(Arc::new(PdfDirectoryLoader::new()))
//!     .chunker(Arc::new(RecursiveCharacterChunker::default()))
//!     .embedding_provider(embedder)
//!     .vector_store(store)
//!     .build()?;
//!
//! let report = ingestor.run(Path::new("data")).await?;
//! println!("wrote {} chunks", report.chunks_written);
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chunking::Chunker;
use crate::document::{Chunk, EmbeddedChunk, filter_documents};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::loader::DocumentLoader;
use crate::vectorstore::VectorStore;

/// Default number of chunks embedded per API request.
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 64;

/// Configuration for an ingestion run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Name of the target vector index.
    pub index_name: String,
    /// Number of chunks embedded per API request.
    pub embed_batch_size: usize,
}

impl IngestConfig {
    /// Create a config targeting the named index.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the index name is empty.
    pub fn new(index_name: impl Into<String>) -> Result<Self> {
        let index_name = index_name.into();
        if index_name.is_empty() {
            return Err(RagError::Config("index name must not be empty".to_string()));
        }
        Ok(Self { index_name, embed_batch_size: DEFAULT_EMBED_BATCH_SIZE })
    }

    /// Set the embedding batch size.
    pub fn with_embed_batch_size(mut self, size: usize) -> Self {
        self.embed_batch_size = size.max(1);
        self
    }
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestionReport {
    /// Number of documents successfully loaded from the source directory.
    pub documents_loaded: usize,
    /// Number of chunks successfully written to the index.
    pub chunks_written: usize,
    /// Per-file and per-document failure messages collected along the way.
    pub errors: Vec<String>,
}

/// The ingestion driver: loader → filter → chunker → embedder → index.
pub struct Ingestor {
    config: IngestConfig,
    loader: Arc<dyn DocumentLoader>,
    chunker: Arc<dyn Chunker>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl Ingestor {
    /// Create a new [`IngestorBuilder`].
    pub fn builder() -> IngestorBuilder {
        IngestorBuilder::default()
    }

    /// Run the full pipeline against a source directory.
    ///
    /// The index is created with the embedding provider's dimensionality
    /// and reused if it already exists. An empty directory completes with
    /// `chunks_written == 0` and no errors.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Index`] if the index cannot be created and
    /// [`RagError::Load`] if the directory itself is unreadable.
    /// Per-document failures do not abort the run; they are recorded in
    /// the report and `chunks_written` keeps the partial progress.
    pub async fn run(&self, source_dir: &Path) -> Result<IngestionReport> {
        let index = &self.config.index_name;
        let dimensions = self.embedding_provider.dimensions();

        info!(
            index = %index,
            dimensions,
            model = self.embedding_provider.model_tag(),
            source_dir = %source_dir.display(),
            "starting ingestion"
        );

        self.vector_store.create_index(index, dimensions).await?;

        let outcome = self.loader.load(source_dir).await?;
        let mut report = IngestionReport {
            documents_loaded: outcome.documents.len(),
            chunks_written: 0,
            errors: outcome.errors,
        };

        for document in filter_documents(outcome.documents) {
            let source = document.source.clone().unwrap_or_else(|| "<unknown>".to_string());
            let chunks = self.chunker.chunk(&document);
            if chunks.is_empty() {
                info!(source = %source, chunk_count = 0, "document produced no chunks");
                continue;
            }

            let (written, error) = self.write_chunks(&chunks).await;
            report.chunks_written += written;
            match error {
                None => info!(source = %source, chunk_count = written, "ingested document"),
                Some(e) => {
                    warn!(source = %source, error = %e, written, "document partially ingested");
                    report.errors.push(format!("{source}: {e}"));
                }
            }
        }

        info!(
            index = %index,
            documents = report.documents_loaded,
            chunks_written = report.chunks_written,
            errors = report.errors.len(),
            "ingestion finished"
        );
        Ok(report)
    }

    /// Embed and upsert one document's chunks in batches.
    ///
    /// Returns the number of chunks written before the first failure, if
    /// any, so partial progress is never lost.
    async fn write_chunks(&self, chunks: &[Chunk]) -> (usize, Option<RagError>) {
        let mut written = 0;
        for batch in chunks.chunks(self.config.embed_batch_size) {
            let texts: Vec<&str> = batch.iter().map(|c| c.content.as_str()).collect();

            let embeddings = match self.embedding_provider.embed_batch(&texts).await {
                Ok(embeddings) => embeddings,
                Err(e) => return (written, Some(e)),
            };
            if embeddings.len() != batch.len() {
                return (
                    written,
                    Some(RagError::Embedding {
                        provider: self.embedding_provider.model_tag().to_string(),
                        message: format!(
                            "provider returned {} embeddings for {} chunks",
                            embeddings.len(),
                            batch.len()
                        ),
                    }),
                );
            }

            // Explicit chunk-to-vector pairing; never positional across calls.
            let embedded: Vec<EmbeddedChunk> = batch
                .iter()
                .cloned()
                .zip(embeddings)
                .map(|(chunk, embedding)| EmbeddedChunk { chunk, embedding })
                .collect();

            if let Err(e) = self.vector_store.upsert(&self.config.index_name, &embedded).await {
                return (written, Some(e));
            }
            written += embedded.len();
        }
        (written, None)
    }
}

/// Builder for constructing an [`Ingestor`].
#[derive(Default)]
pub struct IngestorBuilder {
    config: Option<IngestConfig>,
    loader: Option<Arc<dyn DocumentLoader>>,
    chunker: Option<Arc<dyn Chunker>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
}

impl IngestorBuilder {
    /// Set the ingestion configuration.
    pub fn config(mut self, config: IngestConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document loader.
    pub fn loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Set the chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Build the [`Ingestor`], validating that all fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<Ingestor> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let loader =
            self.loader.ok_or_else(|| RagError::Config("loader is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::Config("vector_store is required".to_string()))?;

        Ok(Ingestor { config, loader, chunker, embedding_provider, vector_store })
    }
}
