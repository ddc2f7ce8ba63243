//! Ingestion driver tests against the in-memory store with stub collaborators.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use finbot_rag::chunking::RecursiveCharacterChunker;
use finbot_rag::document::RawDocument;
use finbot_rag::embedding::EmbeddingProvider;
use finbot_rag::error::{RagError, Result};
use finbot_rag::ingest::{IngestConfig, Ingestor};
use finbot_rag::inmemory::InMemoryVectorStore;
use finbot_rag::loader::{DocumentLoader, LoadOutcome, PdfDirectoryLoader};
use finbot_rag::vectorstore::VectorStore;

const DIM: usize = 4;

/// Loader that returns a fixed set of documents.
struct StubLoader {
    documents: Vec<(String, String)>,
}

impl StubLoader {
    fn new(documents: &[(&str, &str)]) -> Self {
        Self {
            documents: documents
                .iter()
                .map(|(source, content)| (source.to_string(), content.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl DocumentLoader for StubLoader {
    async fn load(&self, _dir: &Path) -> Result<LoadOutcome> {
        let documents = self
            .documents
            .iter()
            .map(|(source, content)| {
                let mut metadata = HashMap::new();
                metadata.insert("source".to_string(), source.clone());
                metadata.insert("producer".to_string(), "stub".to_string());
                RawDocument { content: content.clone(), metadata }
            })
            .collect();
        Ok(LoadOutcome { documents, errors: Vec::new() })
    }
}

/// Deterministic embedder; fails on any text containing `fail_marker`.
struct StubEmbedder {
    fail_marker: Option<String>,
}

impl StubEmbedder {
    fn new() -> Self {
        Self { fail_marker: None }
    }

    fn failing_on(marker: &str) -> Self {
        Self { fail_marker: Some(marker.to_string()) }
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(marker) = &self.fail_marker {
            if text.contains(marker) {
                return Err(RagError::Embedding {
                    provider: "stub".to_string(),
                    message: "simulated embedding failure".to_string(),
                });
            }
        }
        // Content-derived so identical text always embeds identically.
        let mut v = vec![0.0f32; DIM];
        for (i, b) in text.bytes().enumerate() {
            v[i % DIM] += f32::from(b) / 255.0;
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn model_tag(&self) -> &str {
        "stub-embedder"
    }
}

fn ingestor(
    loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<InMemoryVectorStore>,
) -> Ingestor {
    Ingestor::builder()
        .config(IngestConfig::new("finance-bot").unwrap())
        .loader(loader)
        .chunker(Arc::new(RecursiveCharacterChunker::new(50, 10).unwrap()))
        .embedding_provider(embedder)
        .vector_store(store)
        .build()
        .unwrap()
}

#[tokio::test]
async fn empty_directory_completes_with_zero_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVectorStore::new());
    let ingestor =
        ingestor(Arc::new(PdfDirectoryLoader::new()), Arc::new(StubEmbedder::new()), store.clone());

    let report = ingestor.run(dir.path()).await.unwrap();
    assert_eq!(report.documents_loaded, 0);
    assert_eq!(report.chunks_written, 0);
    assert!(report.errors.is_empty());
    // The index is still created so query-time checks have something to find.
    assert_eq!(store.index_dimensions("finance-bot").await.unwrap(), Some(DIM));
}

#[tokio::test]
async fn missing_directory_aborts_with_load_error() {
    let store = Arc::new(InMemoryVectorStore::new());
    let ingestor =
        ingestor(Arc::new(PdfDirectoryLoader::new()), Arc::new(StubEmbedder::new()), store);

    let result = ingestor.run(Path::new("/nonexistent/finbot-data")).await;
    assert!(matches!(result, Err(RagError::Load { .. })));
}

#[tokio::test]
async fn documents_are_chunked_embedded_and_written() {
    let loader = StubLoader::new(&[
        ("a.pdf", "Interest rates climbed steadily across the first quarter of the year."),
        ("b.pdf", "Bond yields fell."),
    ]);
    let store = Arc::new(InMemoryVectorStore::new());
    let ingestor = ingestor(Arc::new(loader), Arc::new(StubEmbedder::new()), store.clone());

    let report = ingestor.run(Path::new("unused")).await.unwrap();
    assert_eq!(report.documents_loaded, 2);
    assert!(report.chunks_written >= 2);
    assert!(report.errors.is_empty());
    assert_eq!(store.vector_count("finance-bot").await, Some(report.chunks_written));
}

#[tokio::test]
async fn reingestion_is_idempotent() {
    let documents =
        [("a.pdf", "Inflation expectations remained anchored through the second half."),
         ("b.pdf", "Equity markets rallied on stronger than expected earnings reports.")];
    let store = Arc::new(InMemoryVectorStore::new());

    let first = ingestor(
        Arc::new(StubLoader::new(&documents)),
        Arc::new(StubEmbedder::new()),
        store.clone(),
    );
    let report_one = first.run(Path::new("unused")).await.unwrap();
    let count_after_first = store.vector_count("finance-bot").await.unwrap();

    let second = ingestor(
        Arc::new(StubLoader::new(&documents)),
        Arc::new(StubEmbedder::new()),
        store.clone(),
    );
    let report_two = second.run(Path::new("unused")).await.unwrap();
    let count_after_second = store.vector_count("finance-bot").await.unwrap();

    assert_eq!(report_one.chunks_written, report_two.chunks_written);
    assert_eq!(count_after_first, count_after_second);
}

#[tokio::test]
async fn one_bad_document_does_not_abort_the_batch() {
    let loader = StubLoader::new(&[
        ("good.pdf", "Dividends were paid quarterly to shareholders of record."),
        ("bad.pdf", "POISON this document cannot be embedded"),
        ("also-good.pdf", "The fund's expense ratio decreased year over year."),
    ]);
    let store = Arc::new(InMemoryVectorStore::new());
    let ingestor =
        ingestor(Arc::new(loader), Arc::new(StubEmbedder::failing_on("POISON")), store.clone());

    let report = ingestor.run(Path::new("unused")).await.unwrap();
    assert_eq!(report.documents_loaded, 3);
    assert!(report.chunks_written >= 2, "good documents must still be written");
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("bad.pdf"));
    assert_eq!(store.vector_count("finance-bot").await, Some(report.chunks_written));
}

#[tokio::test]
async fn builder_requires_all_collaborators() {
    let result = Ingestor::builder().config(IngestConfig::new("finance-bot").unwrap()).build();
    assert!(matches!(result, Err(RagError::Config(_))));
}
