//! HTTP query service for the Finbot finance Q&A pipeline.
//!
//! Exposes the retrieval pipeline over three routes: a welcome page, a
//! health check, and `POST /query`, which returns a structured
//! `{status, answer, error}` envelope. Internal failures are always
//! caught at the handler and reported in-band.

pub mod routes;
pub mod server;

pub use routes::{AppState, QueryRequest, QueryResponse, build_router};
pub use server::{QueryServer, ServerError};
