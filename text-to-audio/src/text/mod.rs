//! Text processing: chunking and synthesis-safe cleanup.

pub mod chunker;
pub mod cleaner;

/// A bounded slice of source text scheduled for one synthesis call.
///
/// The index is assigned at split time and defines the canonical output
/// order; the text is immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    /// Position in the output order
    pub index: usize,
    /// The text content
    pub text: String,
}

impl TextChunk {
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }

    /// Length in characters, the unit the provider limit is defined in.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_chunk_creation() {
        let chunk = TextChunk::new(3, "Hello world".to_string());
        assert_eq!(chunk.index, 3);
        assert_eq!(chunk.text, "Hello world");
        assert_eq!(chunk.len(), 11);
        assert!(!chunk.is_empty());
    }

    #[test]
    fn test_text_chunk_len_counts_chars() {
        // Cyrillic is two bytes per char; len() must count characters
        let chunk = TextChunk::new(0, "Привет".to_string());
        assert_eq!(chunk.len(), 6);
    }
}
