//! Data types for documents, chunks, and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for deterministic chunk IDs. Fixed so that re-ingesting the
/// same content always produces the same ID.
pub const CHUNK_ID_NAMESPACE: Uuid = Uuid::from_u128(0x7f1b_42d6_9c3e_4a08_b5d1_e20f_6a94_c371);

/// A raw document as produced by a loader: text content plus whatever
/// metadata the source format exposes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawDocument {
    /// The extracted text content of the document.
    pub content: String,
    /// Loader-defined metadata (source path, page count, ...).
    pub metadata: HashMap<String, String>,
}

/// A document narrowed to its content and source identifier.
///
/// This is the only shape the rest of the pipeline sees: every metadata
/// key other than `source` is dropped so downstream records stay small
/// and provider-agnostic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceDocument {
    /// The text content, passed through from the raw document unchanged.
    pub content: String,
    /// The source identifier, if the loader recorded one.
    pub source: Option<String>,
}

/// A bounded-size slice of a source document, the atomic retrieval unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Deterministic identifier derived from `(source, content)`. Acts as
    /// the upsert key, so re-ingesting unchanged content is idempotent.
    pub id: Uuid,
    /// The text content of the chunk.
    pub content: String,
    /// Source identifier inherited verbatim from the parent document.
    pub source: Option<String>,
}

impl Chunk {
    /// Create a chunk with its deterministic ID.
    pub fn new(content: String, source: Option<String>) -> Self {
        let key = format!("{}\0{}", source.as_deref().unwrap_or(""), content);
        let id = Uuid::new_v5(&CHUNK_ID_NAMESPACE, key.as_bytes());
        Self { id, content, source }
    }
}

/// A [`Chunk`] paired with its embedding vector.
///
/// The pairing is explicit so that chunk-to-vector association never
/// depends on positional ordering across batched or concurrent
/// embedding calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddedChunk {
    /// The chunk being stored.
    pub chunk: Chunk,
    /// The embedding vector for the chunk's content.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// Narrow raw documents to content plus `source`.
///
/// Total over any well-formed input: a missing `source` becomes `None`,
/// content is passed through unchanged, and every other metadata key is
/// discarded.
pub fn filter_documents(documents: Vec<RawDocument>) -> Vec<SourceDocument> {
    documents
        .into_iter()
        .map(|doc| SourceDocument {
            content: doc.content,
            source: doc.metadata.get("source").cloned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_keeps_only_source() {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), "data/report.pdf".to_string());
        metadata.insert("pages".to_string(), "12".to_string());
        metadata.insert("producer".to_string(), "pdfTeX".to_string());

        let filtered = filter_documents(vec![RawDocument {
            content: "quarterly results".to_string(),
            metadata,
        }]);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].content, "quarterly results");
        assert_eq!(filtered[0].source.as_deref(), Some("data/report.pdf"));
    }

    #[test]
    fn filter_missing_source_becomes_none() {
        let filtered = filter_documents(vec![RawDocument {
            content: "text".to_string(),
            metadata: HashMap::new(),
        }]);
        assert_eq!(filtered[0].source, None);
    }

    #[test]
    fn chunk_id_is_deterministic() {
        let a = Chunk::new("same text".to_string(), Some("a.pdf".to_string()));
        let b = Chunk::new("same text".to_string(), Some("a.pdf".to_string()));
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn chunk_id_varies_with_source_and_content() {
        let a = Chunk::new("text".to_string(), Some("a.pdf".to_string()));
        let b = Chunk::new("text".to_string(), Some("b.pdf".to_string()));
        let c = Chunk::new("other".to_string(), Some("a.pdf".to_string()));
        assert_ne!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }
}
