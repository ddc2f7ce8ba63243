//! Qdrant vector index backend.
//!
//! Provides [`QdrantVectorStore`] which implements [`VectorStore`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//! Only available when the `qdrant` feature is enabled.

use async_trait::async_trait;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfigKind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder, point_id::PointIdOptions, value::Kind,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;
use uuid::Uuid;

use crate::document::{Chunk, EmbeddedChunk, ScoredChunk};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
///
/// Indexes map to Qdrant collections with cosine distance. Chunk content
/// and source attribution are stored as point payload; point IDs are the
/// deterministic chunk UUIDs, so upserts are idempotent server-side.
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    /// Create a store connecting to the given URL.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Index`] if the client cannot be constructed.
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    /// Create a store from an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::Index { backend: "qdrant".to_string(), message: e.to_string() }
    }

    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn create_index(&self, name: &str, dimensions: usize) -> Result<()> {
        if self.has_index(name).await? {
            debug!(index = name, "qdrant collection already exists, skipping creation");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(index = name, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn has_index(&self, name: &str) -> Result<bool> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        Ok(collections.collections.iter().any(|c| c.name == name))
    }

    async fn index_dimensions(&self, name: &str) -> Result<Option<usize>> {
        if !self.has_index(name).await? {
            return Ok(None);
        }

        let info = self.client.collection_info(name).await.map_err(Self::map_err)?;
        let dimensions = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config)
            .and_then(|kind| match kind {
                VectorsConfigKind::Params(params) => Some(params.size as usize),
                VectorsConfigKind::ParamsMap(_) => None,
            });

        Ok(dimensions)
    }

    async fn upsert(&self, index: &str, chunks: &[EmbeddedChunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = chunks
            .iter()
            .map(|embedded| {
                let mut payload_map = serde_json::Map::new();
                payload_map.insert(
                    "content".to_string(),
                    serde_json::Value::String(embedded.chunk.content.clone()),
                );
                if let Some(source) = &embedded.chunk.source {
                    payload_map
                        .insert("source".to_string(), serde_json::Value::String(source.clone()));
                }

                let payload =
                    Payload::try_from(serde_json::Value::Object(payload_map)).unwrap_or_default();

                PointStruct::new(
                    embedded.chunk.id.to_string(),
                    embedded.embedding.clone(),
                    payload,
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(index, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(index, count = chunks.len(), "upserted chunks to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        index: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(index, embedding.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        let results = response
            .result
            .into_iter()
            .map(|scored| {
                let id = scored
                    .id
                    .as_ref()
                    .and_then(|pid| match &pid.point_id_options {
                        Some(PointIdOptions::Uuid(s)) => Uuid::parse_str(s).ok(),
                        _ => None,
                    })
                    .unwrap_or_else(Uuid::nil);

                let content = scored
                    .payload
                    .get("content")
                    .and_then(Self::extract_string)
                    .unwrap_or_default();
                let source = scored.payload.get("source").and_then(Self::extract_string);

                ScoredChunk { chunk: Chunk { id, content, source }, score: scored.score }
            })
            .collect();

        Ok(results)
    }
}
