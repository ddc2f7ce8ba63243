//! `finbot` — ingest finance documents and serve the query API.
//!
//! Credentials are read from the environment exactly once at startup and
//! passed down as explicit configuration; nothing downstream touches
//! process globals.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use finbot_rag::{
    EmbeddingProvider, IngestConfig, Ingestor, OpenAiConfig, OpenAiEmbedding, OpenAiGenerator,
    PdfDirectoryLoader, QueryConfig, QueryService, RecursiveCharacterChunker, VectorStore,
};
use finbot_server::QueryServer;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "finbot", about = "Finance document Q&A over a vector index", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// One-shot offline ingestion: load, chunk, embed, and index a directory.
    Ingest {
        /// Directory containing the source documents.
        #[arg(long)]
        data_dir: PathBuf,

        /// Target vector index name.
        #[arg(long, default_value = "finance-bot")]
        index: String,

        /// File-name glob for documents to ingest.
        #[arg(long, default_value = "*.pdf")]
        pattern: String,

        /// Maximum chunk size in characters.
        #[arg(long, default_value_t = finbot_rag::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Overlap between consecutive chunks in characters.
        #[arg(long, default_value_t = finbot_rag::DEFAULT_CHUNK_OVERLAP)]
        chunk_overlap: usize,
    },

    /// Serve the HTTP query API.
    Serve {
        /// Listen host.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Listen port.
        #[arg(long, default_value_t = 8000)]
        port: u16,

        /// Vector index name to query.
        #[arg(long, default_value = "finance-bot")]
        index: String,

        /// Number of chunks retrieved as context per query.
        #[arg(long, default_value_t = finbot_rag::DEFAULT_TOP_K)]
        top_k: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let openai = openai_config()?;

    match cli.command {
        Command::Ingest { data_dir, index, pattern, chunk_size, chunk_overlap } => {
            let store = vector_store()?;
            let embedder = Arc::new(OpenAiEmbedding::new(&openai)?);
            tracing::info!(model = embedder.model_tag(), index = %index, "ingesting");

            let ingestor = Ingestor::builder()
                .config(IngestConfig::new(index)?)
                .loader(Arc::new(PdfDirectoryLoader::with_pattern(&pattern)?))
                .chunker(Arc::new(RecursiveCharacterChunker::new(chunk_size, chunk_overlap)?))
                .embedding_provider(embedder)
                .vector_store(store)
                .build()?;

            let report = ingestor.run(&data_dir).await?;
            println!(
                "ingested {} documents, wrote {} chunks ({} errors)",
                report.documents_loaded,
                report.chunks_written,
                report.errors.len()
            );
            for error in &report.errors {
                eprintln!("  {error}");
            }
        }

        Command::Serve { host, port, index, top_k } => {
            let store = vector_store()?;
            let embedder = Arc::new(OpenAiEmbedding::new(&openai)?);
            tracing::info!(model = embedder.model_tag(), index = %index, "serving");

            let service = QueryService::new(
                QueryConfig::new(index)?.with_top_k(top_k)?,
                embedder,
                store,
                Arc::new(OpenAiGenerator::new(&openai)?),
            );
            QueryServer::new(&host, port, Arc::new(service))?.serve().await?;
        }
    }

    Ok(())
}

/// Assemble the OpenAI configuration from the environment.
fn openai_config() -> anyhow::Result<OpenAiConfig> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY must be set (credentials are never hard-coded)")?;
    Ok(OpenAiConfig::new(api_key)?)
}

/// Select the vector store backend.
#[cfg(feature = "qdrant")]
fn vector_store() -> anyhow::Result<Arc<dyn VectorStore>> {
    let url =
        std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6334".to_string());
    tracing::info!(url = %url, "using qdrant vector store");
    Ok(Arc::new(finbot_rag::QdrantVectorStore::new(&url)?))
}

/// Select the vector store backend.
///
/// Without the `qdrant` feature the in-memory store is used; it does not
/// persist between the `ingest` and `serve` invocations, so it is only
/// useful for development.
#[cfg(not(feature = "qdrant"))]
fn vector_store() -> anyhow::Result<Arc<dyn VectorStore>> {
    tracing::warn!("qdrant feature disabled, using non-persistent in-memory store");
    Ok(Arc::new(finbot_rag::InMemoryVectorStore::new()))
}
