//! Bounded-size hierarchical text splitting.
//!
//! Splitting prefers the largest structural unit that fits: whole
//! paragraphs are packed greedily into chunks, a paragraph too large for
//! any chunk falls back to sentence packing, an oversized sentence falls
//! back to word packing, and only a single whitespace-free token longer
//! than the limit is ever cut mid-word. All sizes are measured in
//! characters, since that is the unit the provider limit is defined in.

use super::TextChunk;
use thiserror::Error;

/// Default maximum chunk size in characters. The SpeechKit request limit
/// is 5000; this leaves headroom for markup the API may add.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 4500;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChunkError {
    #[error("no text to process: input is empty after normalization")]
    EmptyInput,
}

/// Split `text` into chunks of at most `max_size` characters.
///
/// Chunk indices are contiguous from zero and follow source order.
/// Returns an error if the input contains no text at all.
pub fn split_text(text: &str, max_size: usize) -> Result<Vec<TextChunk>, ChunkError> {
    let normalized = normalize_text(text);
    if normalized.is_empty() {
        return Err(ChunkError::EmptyInput);
    }

    let pieces = if char_len(&normalized) <= max_size {
        vec![normalized]
    } else {
        pack_paragraphs(&normalized, max_size)
    };

    let chunks: Vec<TextChunk> = pieces
        .into_iter()
        .filter(|piece| !piece.trim().is_empty())
        .enumerate()
        .map(|(index, piece)| TextChunk::new(index, piece))
        .collect();

    for chunk in &chunks {
        if chunk.len() > max_size {
            log::warn!(
                "chunk {} exceeds the size limit: {} > {} chars",
                chunk.index,
                chunk.len(),
                max_size
            );
        }
    }

    Ok(chunks)
}

/// Normalize line endings and whitespace before splitting.
///
/// CRLF and bare CR become LF, runs of spaces and tabs collapse to one
/// space, every line is trimmed, and runs of blank lines collapse to a
/// single blank line so that `\n\n` reliably marks a paragraph break.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut result = String::with_capacity(text.len());
    let mut pending_break: Option<&str> = None;
    for line in text.split('\n') {
        let mut collapsed = String::with_capacity(line.len());
        let mut prev_space = false;
        for c in line.chars() {
            if c == ' ' || c == '\t' {
                if !prev_space {
                    collapsed.push(' ');
                    prev_space = true;
                }
            } else {
                collapsed.push(c);
                prev_space = false;
            }
        }
        let line = collapsed.trim();

        if line.is_empty() {
            if !result.is_empty() {
                pending_break = Some("\n\n");
            }
            continue;
        }
        if let Some(sep) = pending_break.take() {
            result.push_str(sep);
        }
        result.push_str(line);
        pending_break = Some("\n");
    }
    result
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Greedily pack `units` into chunks of at most `max_size` characters,
/// joined with `separator`.
///
/// A unit that alone exceeds the limit is handed to `split_overflow`;
/// all of its pieces but the last are sealed as chunks immediately, and
/// the last stays open so following units can pack onto it.
fn pack_units<F>(units: Vec<String>, separator: &str, max_size: usize, split_overflow: F) -> Vec<String>
where
    F: Fn(&str) -> Vec<String>,
{
    let sep_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for unit in units {
        let unit_len = char_len(&unit);
        if unit_len == 0 {
            continue;
        }

        if unit_len > max_size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let mut pieces = split_overflow(&unit);
            if let Some(last) = pieces.pop() {
                chunks.extend(pieces);
                current_len = char_len(&last);
                current = last;
            }
        } else if current.is_empty() {
            current = unit;
            current_len = unit_len;
        } else if current_len + sep_len + unit_len <= max_size {
            current.push_str(separator);
            current.push_str(&unit);
            current_len += sep_len + unit_len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current = unit;
            current_len = unit_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn pack_paragraphs(text: &str, max_size: usize) -> Vec<String> {
    let paragraphs = text.split("\n\n").map(str::to_string).collect();
    pack_units(paragraphs, "\n\n", max_size, |paragraph| {
        pack_sentences(paragraph, max_size)
    })
}

fn pack_sentences(paragraph: &str, max_size: usize) -> Vec<String> {
    pack_units(split_sentences(paragraph), " ", max_size, |sentence| {
        pack_words(sentence, max_size)
    })
}

fn pack_words(sentence: &str, max_size: usize) -> Vec<String> {
    let words = sentence.split_whitespace().map(str::to_string).collect();
    pack_units(words, " ", max_size, |word| hard_cut(word, max_size))
}

/// Split on runs of sentence terminators followed by whitespace, keeping
/// each terminator attached to the sentence it ends.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            while let Some(&next) = chars.peek() {
                if matches!(next, '.' | '!' | '?') {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            if chars.peek().is_some_and(|next| next.is_whitespace()) {
                sentences.push(current.trim().to_string());
                current.clear();
            }
        }
    }

    let tail = current.trim().to_string();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences.retain(|s| !s.is_empty());
    sentences
}

/// Fixed-size slices of exactly `max_size` characters (the last may be
/// shorter). The only level allowed to split inside a word.
fn hard_cut(word: &str, max_size: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(max_size.max(1))
        .map(|piece| piece.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn non_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = split_text("Hello world.", 4500).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "Hello world.");
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert_eq!(split_text("", 4500), Err(ChunkError::EmptyInput));
        assert_eq!(split_text("  \n\t \r\n ", 4500), Err(ChunkError::EmptyInput));
    }

    #[test]
    fn test_normalize_line_endings_and_tabs() {
        let normalized = normalize_text("one\r\ntwo\rthree\tfour   five");
        assert_eq!(normalized, "one\ntwo\nthree four five");
    }

    #[test]
    fn test_normalize_collapses_blank_runs() {
        let normalized = normalize_text("alpha\n\n\n\n\nbeta\n\ngamma");
        assert_eq!(normalized, "alpha\n\nbeta\n\ngamma");
    }

    #[test]
    fn test_normalize_trims_lines() {
        let normalized = normalize_text("  lead\n trail  \n");
        assert_eq!(normalized, "lead\ntrail");
    }

    #[test]
    fn test_paragraphs_pack_without_splitting() {
        // Ten 400-char paragraphs with a 1000-char limit: each paragraph
        // fits, so none may be cut across chunks.
        let paragraph = "a".repeat(400);
        let text = vec![paragraph.clone(); 10].join("\n\n");
        let chunks = split_text(&text, 1000).unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 1000);
            for part in chunk.text.split("\n\n") {
                assert_eq!(part, paragraph);
            }
        }
    }

    #[test]
    fn test_oversized_paragraph_falls_back_to_sentences() {
        let text = "First sentence here. Second sentence here. Third one!";
        let chunks = split_text(text, 25).unwrap();

        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.len() <= 25, "{:?} too long", chunk.text);
        }
        assert_eq!(chunks[0].text, "First sentence here.");
    }

    #[test]
    fn test_oversized_sentence_falls_back_to_words() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = split_text(text, 12).unwrap();

        for chunk in &chunks {
            assert!(chunk.len() <= 12);
            // No word may be cut; every chunk is whole words
            for word in chunk.text.split(' ') {
                assert!(text.contains(word));
            }
        }
        assert_eq!(non_whitespace(text), {
            let joined: String = chunks.iter().map(|c| c.text.as_str()).collect();
            non_whitespace(&joined)
        });
    }

    #[test]
    fn test_giant_token_is_hard_cut() {
        let text = "x".repeat(10);
        let chunks = split_text(&text, 3).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["xxx", "xxx", "xxx", "x"]);
    }

    #[test]
    fn test_hard_cut_tail_packs_with_following_words() {
        // After a hard cut, the short tail stays open so small following
        // words can share its chunk.
        let long = "y".repeat(7);
        let text = format!("{long} ab");
        let chunks = split_text(&text, 5).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["yyyyy", "yy ab"]);
    }

    #[test]
    fn test_sentence_terminators_stay_attached() {
        let sentences = split_sentences("Wait... what?! Really? Yes");
        assert_eq!(sentences, vec!["Wait... what?!", "Really?", "Yes"]);
    }

    #[test]
    fn test_terminator_without_whitespace_does_not_split() {
        // e.g. decimals and file names
        let sentences = split_sentences("Version 2.5 shipped");
        assert_eq!(sentences, vec!["Version 2.5 shipped"]);
    }

    #[test]
    fn test_indices_are_contiguous() {
        let text = "para one here.\n\npara two here.\n\npara three here.";
        let chunks = split_text(text, 16).unwrap();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    #[test]
    fn test_unicode_sizes_measured_in_chars() {
        // 6 chars x 3 bytes each; with limit 7 the byte length (18) must
        // not trigger a split
        let text = "да да да";
        let chunks = split_text(text, 8).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_chunks_respect_size_limit(
            text in "[a-zA-Zа-яё .!?\\n\\t-]{1,600}",
            max_size in 5usize..80,
        ) {
            if let Ok(chunks) = split_text(&text, max_size) {
                for chunk in &chunks {
                    prop_assert!(chunk.len() <= max_size,
                        "chunk {:?} has {} chars, limit {}",
                        chunk.text, chunk.len(), max_size);
                }
            }
        }

        #[test]
        fn prop_no_content_is_lost(
            text in "[a-zA-Zа-яё .!?\\n\\t-]{1,600}",
            max_size in 5usize..80,
        ) {
            if let Ok(chunks) = split_text(&text, max_size) {
                let joined: String = chunks.iter().map(|c| c.text.as_str()).collect();
                prop_assert_eq!(non_whitespace(&text), non_whitespace(&joined));
            }
        }

        #[test]
        fn prop_indices_contiguous_from_zero(
            text in "[a-z .!?\\n]{1,400}",
            max_size in 5usize..60,
        ) {
            if let Ok(chunks) = split_text(&text, max_size) {
                for (i, chunk) in chunks.iter().enumerate() {
                    prop_assert_eq!(chunk.index, i);
                }
            }
        }
    }
}
