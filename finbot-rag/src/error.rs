//! Error types for the `finbot-rag` crate.

use thiserror::Error;

/// Errors that can occur in the ingestion and retrieval pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// A source directory or file could not be read.
    #[error("Load error ({path}): {message}")]
    Load {
        /// The path that could not be loaded.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error (bad chunking parameters,
    /// missing credentials, mismatched embedding dimensions).
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in the vector index backend.
    #[error("Index error ({backend}): {message}")]
    Index {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error during answer generation.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
