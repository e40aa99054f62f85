//! Input document handlers.
//!
//! Every supported format implements [`FileHandler`] and is selected
//! through an extension-keyed registry, so adding a format means adding
//! one module and one `register` call.

pub mod docx;
pub mod markdown;
pub mod pdf;
pub mod text;

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("unsupported file format \".{extension}\" (supported: {supported})")]
    UnsupportedFormat { extension: String, supported: String },
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("could not parse {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl HandlerError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}

/// Capability interface implemented once per input format.
pub trait FileHandler: Send + Sync + std::fmt::Debug {
    /// Extensions this handler accepts (lowercase, no dot).
    fn extensions(&self) -> &'static [&'static str];

    /// Extract the document's plain text.
    fn extract_text(&self, path: &Path) -> Result<String, HandlerError>;

    /// Cheap validation without full extraction.
    fn validate(&self, path: &Path) -> Result<(), HandlerError> {
        if !path.exists() {
            return Err(HandlerError::NotFound(path.display().to_string()));
        }
        Ok(())
    }
}

/// Extension-keyed lookup of file handlers.
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn FileHandler>>,
    by_extension: HashMap<&'static str, usize>,
}

impl HandlerRegistry {
    /// Registry with every built-in handler registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            handlers: Vec::new(),
            by_extension: HashMap::new(),
        };
        registry.register(Box::new(text::TextHandler));
        registry.register(Box::new(markdown::MarkdownHandler));
        registry.register(Box::new(docx::DocxHandler));
        registry.register(Box::new(pdf::PdfHandler));
        registry
    }

    pub fn register(&mut self, handler: Box<dyn FileHandler>) {
        let idx = self.handlers.len();
        for ext in handler.extensions() {
            self.by_extension.insert(ext, idx);
        }
        self.handlers.push(handler);
    }

    /// Handler matching the path's extension (case-insensitive).
    pub fn handler_for(&self, path: &Path) -> Result<&dyn FileHandler, HandlerError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        self.by_extension
            .get(extension.as_str())
            .map(|&i| self.handlers[i].as_ref())
            .ok_or_else(|| HandlerError::UnsupportedFormat {
                extension,
                supported: self.supported_extensions().join(", "),
            })
    }

    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<_> = self.by_extension.keys().copied().collect();
        exts.sort_unstable();
        exts
    }

    /// Validate `path` and extract its text with the matching handler.
    pub fn extract_text(&self, path: &Path) -> Result<String, HandlerError> {
        let handler = self.handler_for(path)?;
        handler.validate(path)?;
        log::debug!("reading {} with the {} handler", path.display(), handler.extensions()[0]);
        handler.extract_text(path)
    }
}
