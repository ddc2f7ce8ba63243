//! Router and request handlers.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Json, State};
use axum::routing::{get, post};
use finbot_rag::QueryService;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The query pipeline answering questions.
    pub query_service: Arc<QueryService>,
}

/// A free-text question about the indexed corpus.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// The user's question.
    pub query: String,
}

/// The service's answer envelope.
///
/// Failures are carried in-band: `status` is `"error"` and `error` holds
/// the message. The transport status is 200 either way so browser clients
/// always get a structured body.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    /// `"success"` or `"error"`.
    pub status: String,
    /// The generated answer; empty on error.
    pub answer: String,
    /// Failure message, if any.
    pub error: Option<String>,
}

impl QueryResponse {
    fn success(answer: String) -> Self {
        Self { status: "success".to_string(), answer, error: None }
    }

    fn failure(message: String) -> Self {
        Self { status: "error".to_string(), answer: String::new(), error: Some(message) }
    }
}

/// Build the application router.
///
/// CORS is permissive so a browser frontend on another origin can call
/// the API directly.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/query", post(query))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Finbot API",
        "health": "/health",
        "query": "/query",
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Answer a question. Every internal failure is caught here and surfaced
/// as a structured error response, never as an unhandled transport fault.
async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResponse> {
    match state.query_service.answer(&request.query).await {
        Ok(answer) => Json(QueryResponse::success(answer)),
        Err(e) => {
            error!(error = %e, "query failed");
            Json(QueryResponse::failure(e.to_string()))
        }
    }
}
