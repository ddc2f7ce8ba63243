//! Vector index trait for storing and searching embedded chunks.

use async_trait::async_trait;

use crate::document::{EmbeddedChunk, ScoredChunk};
use crate::error::Result;

/// A storage backend for embedded chunks with similarity search.
///
/// Implementations manage named indexes and support idempotent upserts
/// (keyed by chunk ID) and top-k nearest-neighbor queries by cosine
/// similarity.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named index with the given dimensionality. No-op if it
    /// already exists.
    async fn create_index(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Return whether the named index exists.
    async fn has_index(&self, name: &str) -> Result<bool>;

    /// Return the dimensionality the index was created with, or `None`
    /// if the index does not exist.
    ///
    /// Query paths compare this against the embedding provider's
    /// dimensionality so that ingestion and retrieval cannot silently use
    /// mismatched models.
    async fn index_dimensions(&self, name: &str) -> Result<Option<usize>>;

    /// Upsert chunks into an index, keyed by chunk ID.
    ///
    /// Re-upserting a chunk with an unchanged ID replaces it rather than
    /// adding a duplicate.
    async fn upsert(&self, index: &str, chunks: &[EmbeddedChunk]) -> Result<()>;

    /// Search for the `top_k` most similar chunks to the given embedding.
    ///
    /// Returns results ordered by descending similarity score.
    async fn search(&self, index: &str, embedding: &[f32], top_k: usize)
    -> Result<Vec<ScoredChunk>>;
}
