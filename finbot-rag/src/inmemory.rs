//! In-memory vector index using cosine similarity.
//!
//! [`InMemoryVectorStore`] backs indexes with a `HashMap` behind a
//! `tokio::sync::RwLock`. It is suitable for development and testing;
//! the data does not survive the process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::{EmbeddedChunk, ScoredChunk};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

struct IndexData {
    dimensions: usize,
    chunks: HashMap<Uuid, EmbeddedChunk>,
}

/// An in-memory [`VectorStore`] using cosine similarity for search.
#[derive(Default)]
pub struct InMemoryVectorStore {
    indexes: RwLock<HashMap<String, IndexData>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vectors currently stored in an index, if it exists.
    pub async fn vector_count(&self, index: &str) -> Option<usize> {
        self.indexes.read().await.get(index).map(|data| data.chunks.len())
    }

    fn missing_index(index: &str) -> RagError {
        RagError::Index {
            backend: "InMemory".to_string(),
            message: format!("index '{index}' does not exist"),
        }
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_index(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut indexes = self.indexes.write().await;
        indexes
            .entry(name.to_string())
            .or_insert_with(|| IndexData { dimensions, chunks: HashMap::new() });
        Ok(())
    }

    async fn has_index(&self, name: &str) -> Result<bool> {
        Ok(self.indexes.read().await.contains_key(name))
    }

    async fn index_dimensions(&self, name: &str) -> Result<Option<usize>> {
        Ok(self.indexes.read().await.get(name).map(|data| data.dimensions))
    }

    async fn upsert(&self, index: &str, chunks: &[EmbeddedChunk]) -> Result<()> {
        let mut indexes = self.indexes.write().await;
        let data = indexes.get_mut(index).ok_or_else(|| Self::missing_index(index))?;
        for chunk in chunks {
            if chunk.embedding.len() != data.dimensions {
                return Err(RagError::Index {
                    backend: "InMemory".to_string(),
                    message: format!(
                        "vector has {} dimensions, index '{index}' expects {}",
                        chunk.embedding.len(),
                        data.dimensions
                    ),
                });
            }
            data.chunks.insert(chunk.chunk.id, chunk.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        index: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let indexes = self.indexes.read().await;
        let data = indexes.get(index).ok_or_else(|| Self::missing_index(index))?;

        let mut scored: Vec<ScoredChunk> = data
            .chunks
            .values()
            .map(|stored| ScoredChunk {
                chunk: stored.chunk.clone(),
                score: cosine_similarity(&stored.embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}
