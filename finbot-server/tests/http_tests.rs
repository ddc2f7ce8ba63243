//! End-to-end HTTP tests with stub collaborators behind the real router.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use finbot_rag::document::{Chunk, EmbeddedChunk};
use finbot_rag::embedding::EmbeddingProvider;
use finbot_rag::error::{RagError, Result};
use finbot_rag::generation::Generator;
use finbot_rag::inmemory::InMemoryVectorStore;
use finbot_rag::query::{QueryConfig, QueryService};
use finbot_rag::vectorstore::VectorStore;
use finbot_server::routes::{AppState, QueryResponse, build_router};
use http_body_util::BodyExt;
use tower::ServiceExt;

const DIM: usize = 3;
const INDEX: &str = "finance-bot";

struct StubEmbedder;

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        // Orthogonal-ish toy embedding keyed on a few topic words.
        let t = text.to_lowercase();
        Ok(vec![
            if t.contains("bond") { 1.0 } else { 0.1 },
            if t.contains("equity") { 1.0 } else { 0.1 },
            0.1,
        ])
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn model_tag(&self) -> &str {
        "stub-embedder"
    }
}

/// Echoes the retrieved context or declines when there is none relevant.
struct StubGenerator {
    decline: bool,
}

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(&self, context: &[String], _question: &str) -> Result<String> {
        if self.decline || context.is_empty() {
            return Ok("I don't know based on the provided documents.".to_string());
        }
        Ok(format!("Based on the documents: {}", context[0]))
    }
}

struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _context: &[String], _question: &str) -> Result<String> {
        Err(RagError::Generation {
            provider: "stub".to_string(),
            message: "model unavailable".to_string(),
        })
    }
}

async fn seeded_store() -> Arc<InMemoryVectorStore> {
    let store = Arc::new(InMemoryVectorStore::new());
    store.create_index(INDEX, DIM).await.unwrap();
    let embedder = StubEmbedder;
    let content = "Bonds are debt securities issued by governments and corporations.";
    let embedding = embedder.embed(content).await.unwrap();
    store
        .upsert(
            INDEX,
            &[EmbeddedChunk {
                chunk: Chunk::new(content.to_string(), Some("bonds.pdf".to_string())),
                embedding,
            }],
        )
        .await
        .unwrap();
    store
}

fn app(store: Arc<InMemoryVectorStore>, generator: Arc<dyn Generator>) -> axum::Router {
    let service = QueryService::new(
        QueryConfig::new(INDEX).unwrap(),
        Arc::new(StubEmbedder),
        store,
        generator,
    );
    build_router(AppState { query_service: Arc::new(service) })
}

fn query_request(query: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "query": query }).to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> QueryResponse {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let app = app(seeded_store().await, Arc::new(StubGenerator { decline: false }));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn query_returns_grounded_answer() {
    let app = app(seeded_store().await, Arc::new(StubGenerator { decline: false }));
    let response = app.oneshot(query_request("What is a bond?")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body.status, "success");
    assert!(body.answer.contains("debt securities"));
    assert_eq!(body.error, None);
}

#[tokio::test]
async fn decline_answer_is_still_a_success() {
    let app = app(seeded_store().await, Arc::new(StubGenerator { decline: true }));
    let response = app.oneshot(query_request("What is the meaning of life?")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body.status, "success");
    assert!(body.answer.starts_with("I don't know"));
    assert_eq!(body.error, None);
}

#[tokio::test]
async fn generation_failure_is_surfaced_in_band() {
    let app = app(seeded_store().await, Arc::new(FailingGenerator));
    let response = app.oneshot(query_request("What is a bond?")).await.unwrap();

    // Failures are structured responses, never transport faults.
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body.status, "error");
    assert_eq!(body.answer, "");
    assert!(body.error.unwrap().contains("model unavailable"));
}

#[tokio::test]
async fn empty_query_is_a_structured_error() {
    let app = app(seeded_store().await, Arc::new(StubGenerator { decline: false }));
    let response = app.oneshot(query_request("  ")).await.unwrap();

    let body = response_json(response).await;
    assert_eq!(body.status, "error");
    assert!(body.error.unwrap().contains("must not be empty"));
}

#[tokio::test]
async fn mismatched_index_dimensions_fail_the_parity_check() {
    let store = Arc::new(InMemoryVectorStore::new());
    // Index created with a different dimensionality than the embedder's.
    store.create_index(INDEX, DIM + 1).await.unwrap();

    let app = app(store, Arc::new(StubGenerator { decline: false }));
    let response = app.oneshot(query_request("What is a bond?")).await.unwrap();

    let body = response_json(response).await;
    assert_eq!(body.status, "error");
    assert!(body.error.unwrap().contains("re-ingest"));
}

#[tokio::test]
async fn missing_index_is_a_structured_error() {
    let app =
        app(Arc::new(InMemoryVectorStore::new()), Arc::new(StubGenerator { decline: false }));
    let response = app.oneshot(query_request("What is a bond?")).await.unwrap();

    let body = response_json(response).await;
    assert_eq!(body.status, "error");
    assert!(body.error.unwrap().contains("does not exist"));
}
