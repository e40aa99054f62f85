//! Plain-text input.

use super::{FileHandler, HandlerError};
use std::path::Path;

#[derive(Debug)]
pub struct TextHandler;

impl FileHandler for TextHandler {
    fn extensions(&self) -> &'static [&'static str] {
        &["txt"]
    }

    fn extract_text(&self, path: &Path) -> Result<String, HandlerError> {
        let bytes = std::fs::read(path).map_err(|e| HandlerError::io(path, e))?;
        // Invalid UTF-8 sequences are replaced, not rejected: a stray
        // legacy-encoded byte should not kill a whole book
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_plain_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Hello, world!").unwrap();
        let text = TextHandler.extract_text(file.path()).unwrap();
        assert_eq!(text, "Hello, world!");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ok \xff\xfe ok").unwrap();
        let text = TextHandler.extract_text(file.path()).unwrap();
        assert!(text.starts_with("ok "));
        assert!(text.ends_with(" ok"));
        assert!(text.contains('\u{FFFD}'));
    }
}
