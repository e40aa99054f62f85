//! Markdown input: formatting is stripped down to readable prose.
//!
//! The voice should narrate the text, not the markup, so code blocks,
//! images and horizontal rules disappear entirely while links and
//! emphasis keep their inner text.

use super::{FileHandler, HandlerError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static FENCED_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]*)`").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s*").unwrap());
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*_]{1,3}([^*_\n]+)[*_]{1,3}").unwrap());
static BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^>\s?").unwrap());
static HORIZONTAL_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[-*_]{3,}\s*$").unwrap());
static LIST_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*(?:[-*+]|\d+\.)\s+").unwrap());
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").unwrap());

#[derive(Debug)]
pub struct MarkdownHandler;

fn strip_markdown(source: &str) -> String {
    let text = FENCED_CODE.replace_all(source, "");
    let text = IMAGE.replace_all(&text, "");
    let text = LINK.replace_all(&text, "$1");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = HEADER.replace_all(&text, "");
    let text = HORIZONTAL_RULE.replace_all(&text, "");
    let text = BLOCKQUOTE.replace_all(&text, "");
    let text = LIST_MARKER.replace_all(&text, "");
    let text = EMPHASIS.replace_all(&text, "$1");
    let text = HTML_TAG.replace_all(&text, "");
    text.trim().to_string()
}

impl FileHandler for MarkdownHandler {
    fn extensions(&self) -> &'static [&'static str] {
        &["md", "markdown"]
    }

    fn extract_text(&self, path: &Path) -> Result<String, HandlerError> {
        let bytes = std::fs::read(path).map_err(|e| HandlerError::io(path, e))?;
        Ok(strip_markdown(&String::from_utf8_lossy(&bytes)))
    }
}
