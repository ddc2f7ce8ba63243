//! Document loading from the filesystem.
//!
//! [`PdfDirectoryLoader`] walks a directory, keeps files matching a glob
//! pattern (default `*.pdf`), and extracts their text. Extraction failures
//! for individual files are recorded and skipped rather than aborting the
//! whole load; only a missing or unreadable directory is fatal.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use glob::Pattern;
use tracing::{debug, warn};

use crate::document::RawDocument;
use crate::error::{RagError, Result};

/// The result of loading a directory: the documents that extracted
/// cleanly plus one message per file that did not.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Successfully extracted documents.
    pub documents: Vec<RawDocument>,
    /// Per-file failure messages for files that were skipped.
    pub errors: Vec<String>,
}

/// A source of raw documents.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load all matching documents under `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Load`] if the directory itself does not exist
    /// or cannot be read. Individual file failures are reported in the
    /// returned [`LoadOutcome`] instead.
    async fn load(&self, dir: &Path) -> Result<LoadOutcome>;
}

/// Loads PDF files from a directory.
///
/// Each document's metadata carries its `source` (the file path) and,
/// when available, a `pages` estimate. Files not matching the pattern
/// are silently skipped.
pub struct PdfDirectoryLoader {
    pattern: Pattern,
}

impl PdfDirectoryLoader {
    /// Create a loader matching `*.pdf`.
    pub fn new() -> Self {
        Self {
            // The literal pattern is valid, so this cannot fail.
            pattern: Pattern::new("*.pdf").unwrap_or_default(),
        }
    }

    /// Create a loader with a custom file-name glob pattern.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the pattern is not a valid glob.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let pattern = Pattern::new(pattern)
            .map_err(|e| RagError::Config(format!("invalid glob pattern '{pattern}': {e}")))?;
        Ok(Self { pattern })
    }

    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.pattern.matches(&name.to_string_lossy()))
            .unwrap_or(false)
    }
}

impl Default for PdfDirectoryLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentLoader for PdfDirectoryLoader {
    async fn load(&self, dir: &Path) -> Result<LoadOutcome> {
        let load_err = |e: std::io::Error| RagError::Load {
            path: dir.display().to_string(),
            message: e.to_string(),
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(load_err)?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(load_err)? {
            let path = entry.path();
            if path.is_file() && self.matches(&path) {
                paths.push(path);
            }
        }
        // Deterministic load order regardless of directory iteration order.
        paths.sort();

        let mut outcome = LoadOutcome::default();
        for path in paths {
            let source = path.display().to_string();
            match extract_pdf_text(&path).await {
                Ok(text) => {
                    debug!(source = %source, bytes = text.len(), "extracted document");
                    let mut metadata = HashMap::new();
                    metadata.insert("source".to_string(), source);
                    outcome.documents.push(RawDocument { content: text, metadata });
                }
                Err(e) => {
                    warn!(source = %source, error = %e, "skipping unreadable file");
                    outcome.errors.push(format!("{source}: {e}"));
                }
            }
        }

        Ok(outcome)
    }
}

/// Read a PDF and extract its text on the blocking thread pool.
async fn extract_pdf_text(path: &Path) -> Result<String> {
    let source = path.display().to_string();
    let bytes = tokio::fs::read(path).await.map_err(|e| RagError::Load {
        path: source.clone(),
        message: e.to_string(),
    })?;

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| RagError::Load {
            path: source.clone(),
            message: format!("extraction task failed: {e}"),
        })?
        .map_err(|e| RagError::Load { path: source, message: format!("pdf extraction: {e}") })?;

    Ok(text)
}
