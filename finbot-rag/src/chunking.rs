//! Document chunking.
//!
//! Provides the [`Chunker`] trait and [`RecursiveCharacterChunker`], a
//! windowed splitter that prefers natural boundaries (paragraph, then
//! line, then word) before resorting to a hard character cut.

use crate::document::{Chunk, SourceDocument};
use crate::error::{RagError, Result};

/// Separator priority: paragraph break, then line break, then word break.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s carrying text and source attribution
/// but no embeddings; embeddings are attached later by the ingestion driver.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty content. Chunks
    /// are produced in document order.
    fn chunk(&self, document: &SourceDocument) -> Vec<Chunk>;
}

/// Splits text into overlapping windows of at most `chunk_size` characters.
///
/// Each window preferentially ends at the last occurrence of the
/// highest-priority separator still inside it (`"\n\n"` over `"\n"` over
/// `" "`), falling back to a hard character cut. The separator stays
/// attached to the preceding chunk. Consecutive chunks from the same
/// document share an overlap region of `chunk_overlap` characters.
///
/// Sizes are measured in characters, and cuts always land on character
/// boundaries, so multi-byte text is handled safely.
#[derive(Debug, Clone)]
pub struct RecursiveCharacterChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

/// Default maximum chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

impl RecursiveCharacterChunker {
    /// Create a chunker with validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size` (which could never terminate).
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Find where the window starting at char `start` should end.
    ///
    /// `bounds[i]` is the byte offset of the `i`-th character;
    /// `window_end` is the char index of the full-size window end.
    /// Returns a char index `end` with `start + chunk_overlap < end <= window_end`,
    /// so the next window always makes forward progress.
    fn split_point(&self, text: &str, bounds: &[usize], start: usize, window_end: usize) -> usize {
        let window = &text[bounds[start]..bounds[window_end]];
        for separator in SEPARATORS {
            if let Some(pos) = window.rfind(separator) {
                // Separators are ASCII, so this lands on a char boundary.
                let end_byte = bounds[start] + pos + separator.len();
                let end = bounds.partition_point(|&b| b < end_byte);
                if end > start + self.chunk_overlap {
                    return end;
                }
            }
        }
        window_end
    }
}

impl Default for RecursiveCharacterChunker {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, chunk_overlap: DEFAULT_CHUNK_OVERLAP }
    }
}

impl Chunker for RecursiveCharacterChunker {
    fn chunk(&self, document: &SourceDocument) -> Vec<Chunk> {
        let text = &document.content;
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every character boundary, plus the end of the text.
        let bounds: Vec<usize> =
            text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let total_chars = bounds.len() - 1;

        // A document that fits in one window is a single chunk.
        if total_chars <= self.chunk_size {
            return vec![Chunk::new(text.clone(), document.source.clone())];
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let window_end = (start + self.chunk_size).min(total_chars);
            let end = if window_end == total_chars {
                total_chars
            } else {
                self.split_point(text, &bounds, start, window_end)
            };

            chunks.push(Chunk::new(
                text[bounds[start]..bounds[end]].to_string(),
                document.source.clone(),
            ));

            if end == total_chars {
                break;
            }
            // split_point guarantees end > start + chunk_overlap.
            start = end - self.chunk_overlap;
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> SourceDocument {
        SourceDocument { content: content.to_string(), source: Some("test.pdf".to_string()) }
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn overlap_at_least_chunk_size_is_rejected() {
        assert!(matches!(RecursiveCharacterChunker::new(100, 100), Err(RagError::Config(_))));
        assert!(matches!(RecursiveCharacterChunker::new(100, 150), Err(RagError::Config(_))));
        assert!(RecursiveCharacterChunker::new(100, 99).is_ok());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(matches!(RecursiveCharacterChunker::new(0, 0), Err(RagError::Config(_))));
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let chunker = RecursiveCharacterChunker::default();
        assert!(chunker.chunk(&doc("")).is_empty());
    }

    #[test]
    fn short_document_yields_single_chunk() {
        let chunker = RecursiveCharacterChunker::default();
        let chunks = chunker.chunk(&doc("short enough"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "short enough");
        assert_eq!(chunks[0].source.as_deref(), Some("test.pdf"));
    }

    #[test]
    fn document_exactly_chunk_size_yields_single_chunk() {
        let chunker = RecursiveCharacterChunker::new(10, 2).unwrap();
        let chunks = chunker.chunk(&doc("abcdefghij"));
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn twelve_hundred_chars_at_500_50_yields_three_chunks() {
        let chunker = RecursiveCharacterChunker::new(500, 50).unwrap();
        let text: String = std::iter::repeat('x').take(1200).collect();
        let chunks = chunker.chunk(&doc(&text));

        assert_eq!(chunks.len(), 3);
        for pair in chunks.windows(2) {
            let prev = chars(&pair[0].content);
            let next = chars(&pair[1].content);
            assert_eq!(&prev[prev.len() - 50..], &next[..50]);
        }
    }

    #[test]
    fn prefers_paragraph_break_over_hard_cut() {
        let chunker = RecursiveCharacterChunker::new(40, 5).unwrap();
        let text = format!("{}\n\n{}", "a".repeat(30), "b".repeat(30));
        let chunks = chunker.chunk(&doc(&text));

        // First chunk ends at the paragraph break, separator attached.
        assert_eq!(chunks[0].content, format!("{}\n\n", "a".repeat(30)));
    }

    #[test]
    fn prefers_word_break_when_no_newlines() {
        let chunker = RecursiveCharacterChunker::new(20, 4).unwrap();
        let text = "alpha beta gamma delta epsilon zeta";
        let chunks = chunker.chunk(&doc(text));

        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 20);
        }
        // No chunk should start or end mid-window when a space was available.
        assert!(chunks[0].content.ends_with(' '));
    }

    #[test]
    fn chunks_never_exceed_chunk_size() {
        let chunker = RecursiveCharacterChunker::new(50, 10).unwrap();
        let text = "word ".repeat(200);
        for chunk in chunker.chunk(&doc(&text)) {
            assert!(chunk.content.chars().count() <= 50);
        }
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let chunker = RecursiveCharacterChunker::new(10, 2).unwrap();
        let text = "é".repeat(35);
        let chunks = chunker.chunk(&doc(&text));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 10);
            assert!(chunk.content.chars().all(|c| c == 'é'));
        }
    }

    #[test]
    fn chunks_inherit_source_in_order() {
        let chunker = RecursiveCharacterChunker::new(30, 5).unwrap();
        let text = "one two three四 five six seven eight nine ten eleven twelve";
        let chunks = chunker.chunk(&doc(text));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert_eq!(chunk.source.as_deref(), Some("test.pdf"));
        }
        // Insertion order reconstructs the document prefix.
        assert!(text.starts_with(&chunks[0].content));
    }
}
