//! DOCX input.
//!
//! A .docx file is a zip container; the narration text lives in the
//! `<w:t>` runs of word/document.xml. Pulling runs with a regex skips a
//! full XML dependency and survives the attribute soup Word emits.

use super::{FileHandler, HandlerError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use std::path::Path;

static PARAGRAPH_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"</w:p>").unwrap());
static TEXT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<w:t[^>]*>([^<]*)</w:t>").unwrap());

#[derive(Debug)]
pub struct DocxHandler;

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn parse_document_xml(xml: &str) -> String {
    let mut paragraphs = Vec::new();
    for paragraph in PARAGRAPH_END.split(xml) {
        let mut text = String::new();
        for run in TEXT_RUN.captures_iter(paragraph) {
            text.push_str(&run[1]);
        }
        let text = decode_entities(text.trim());
        if !text.is_empty() {
            paragraphs.push(text);
        }
    }
    paragraphs.join("\n\n")
}

impl FileHandler for DocxHandler {
    fn extensions(&self) -> &'static [&'static str] {
        &["docx"]
    }

    fn extract_text(&self, path: &Path) -> Result<String, HandlerError> {
        let file = std::fs::File::open(path).map_err(|e| HandlerError::io(path, e))?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| HandlerError::parse(path, format!("not a docx container: {e}")))?;
        let mut entry = archive
            .by_name("word/document.xml")
            .map_err(|e| HandlerError::parse(path, format!("missing word/document.xml: {e}")))?;
        let mut xml = String::new();
        entry
            .read_to_string(&mut xml)
            .map_err(|e| HandlerError::io(path, e))?;
        Ok(parse_document_xml(&xml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_docx(document_xml: &str) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap();
        file
    }

    #[test]
    fn test_paragraphs_become_blank_line_separated() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>
            <w:p><w:r><w:t>Second </w:t></w:r><w:r><w:t xml:space="preserve">paragraph.</w:t></w:r></w:p>
        </w:body></w:document>"#;
        assert_eq!(
            parse_document_xml(xml),
            "First paragraph.\n\nSecond paragraph."
        );
    }

    #[test]
    fn test_entities_are_decoded() {
        let xml = "<w:p><w:r><w:t>Tom &amp; Jerry &lt;3</w:t></w:r></w:p>";
        assert_eq!(parse_document_xml(xml), "Tom & Jerry <3");
    }

    #[test]
    fn test_empty_paragraphs_are_skipped() {
        let xml = "<w:p><w:r><w:t>one</w:t></w:r></w:p><w:p></w:p><w:p><w:r><w:t>two</w:t></w:r></w:p>";
        assert_eq!(parse_document_xml(xml), "one\n\ntwo");
    }

    #[test]
    fn test_extracts_from_real_container() {
        let file = write_docx("<w:p><w:r><w:t>Hello from docx</w:t></w:r></w:p>");
        let text = DocxHandler.extract_text(file.path()).unwrap();
        assert_eq!(text, "Hello from docx");
    }

    #[test]
    fn test_non_zip_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"plain text, not a zip").unwrap();
        let err = DocxHandler.extract_text(file.path()).unwrap_err();
        assert!(matches!(err, HandlerError::Parse { .. }));
    }
}
