//! Synthesis-safe text cleanup.
//!
//! Applied to each chunk right before it is sent to the provider, never
//! before chunking, so the splitter always sees the original structure.
//! Cleanup may leave nothing; the caller treats an empty result as a
//! permanent failure for that chunk.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static ELLIPSIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").unwrap());
static EXCLAMATIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"!{2,}").unwrap());
static QUESTIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?{2,}").unwrap());

// Everything the synthesis voice cannot pronounce gets dropped. Word
// characters here are Unicode-aware, so Cyrillic text passes through.
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^\w\s.,!?;:()\-—–"«»']+"#).unwrap());

/// Clean chunk text for synthesis.
pub fn clean_for_synthesis(text: &str) -> String {
    let text = WHITESPACE.replace_all(text, " ");
    let text = ELLIPSIS.replace_all(&text, "...");
    let text = EXCLAMATIONS.replace_all(&text, "!");
    let text = QUESTIONS.replace_all(&text, "?");
    let text = DISALLOWED.replace_all(&text, "");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_collapses_to_single_spaces() {
        assert_eq!(clean_for_synthesis("a  b\n\nc\td"), "a b c d");
    }

    #[test]
    fn test_period_runs_become_ellipsis() {
        assert_eq!(clean_for_synthesis("wait.."), "wait...");
        assert_eq!(clean_for_synthesis("wait......."), "wait...");
        assert_eq!(clean_for_synthesis("done."), "done.");
    }

    #[test]
    fn test_repeated_terminators_collapse() {
        assert_eq!(clean_for_synthesis("no!!!"), "no!");
        assert_eq!(clean_for_synthesis("what???"), "what?");
    }

    #[test]
    fn test_unpronounceable_symbols_are_dropped() {
        assert_eq!(clean_for_synthesis("price 100$ #tag"), "price 100 tag");
        assert_eq!(clean_for_synthesis("hello 🎵world"), "hello world");
    }

    #[test]
    fn test_allowed_punctuation_survives() {
        let text = r#"He said: "wait, stop!" (twice) — really?"#;
        assert_eq!(clean_for_synthesis(text), text);
    }

    #[test]
    fn test_cyrillic_passes_through() {
        assert_eq!(clean_for_synthesis("Привет, мир!"), "Привет, мир!");
    }

    #[test]
    fn test_symbol_only_input_cleans_to_empty() {
        assert_eq!(clean_for_synthesis("@#$%^&*"), "");
        assert_eq!(clean_for_synthesis("   "), "");
    }

    #[test]
    fn test_result_is_trimmed() {
        assert_eq!(clean_for_synthesis("  hello  "), "hello");
    }
}
