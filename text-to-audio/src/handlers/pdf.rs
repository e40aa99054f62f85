//! PDF input, delegated to the poppler `pdftotext` tool.
//!
//! Text extraction from arbitrary PDFs is a tar pit; poppler already
//! does it well, so this handler shells out the same way the audio
//! merger shells out to ffmpeg.

use super::{FileHandler, HandlerError};
use std::path::Path;
use std::process::Command;

#[derive(Debug)]
pub struct PdfHandler;

impl FileHandler for PdfHandler {
    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn extract_text(&self, path: &Path) -> Result<String, HandlerError> {
        let output = Command::new("pdftotext")
            .args(["-enc", "UTF-8"])
            .arg(path)
            .arg("-") // stdout
            .output()
            .map_err(|e| {
                HandlerError::parse(path, format!("could not run pdftotext (is poppler installed?): {e}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HandlerError::parse(
                path,
                format!("pdftotext failed: {}", stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
