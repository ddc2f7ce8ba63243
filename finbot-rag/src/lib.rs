//! Document ingestion and retrieval core for the Finbot finance Q&A service.
//!
//! The write path loads PDF documents from a directory, narrows their
//! metadata to a `source` identifier, splits them into overlapping
//! character chunks, embeds each chunk, and upserts the vectors into a
//! named index under deterministic IDs (so re-ingestion is idempotent).
//! The read path embeds a question, retrieves the top-k nearest chunks,
//! and hands them to a generation collaborator constrained to answer
//! only from that context.
//!
//! Collaborators sit behind traits ([`DocumentLoader`], [`Chunker`],
//! [`EmbeddingProvider`], [`VectorStore`], [`Generator`]) so the hosted
//! backends can be swapped for in-memory or stub implementations.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod ingest;
pub mod inmemory;
pub mod loader;
pub mod openai;
#[cfg(feature = "qdrant")]
pub mod qdrant;
pub mod query;
mod retry;
pub mod vectorstore;

pub use chunking::{Chunker, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, RecursiveCharacterChunker};
pub use config::OpenAiConfig;
pub use document::{
    Chunk, EmbeddedChunk, RawDocument, ScoredChunk, SourceDocument, filter_documents,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::{Generator, OpenAiGenerator};
pub use ingest::{IngestConfig, IngestionReport, Ingestor};
pub use inmemory::InMemoryVectorStore;
pub use loader::{DocumentLoader, LoadOutcome, PdfDirectoryLoader};
pub use openai::OpenAiEmbedding;
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;
pub use query::{DEFAULT_TOP_K, QueryConfig, QueryService};
pub use vectorstore::VectorStore;
