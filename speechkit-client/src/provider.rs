//! Speech synthesis provider trait and types.

use crate::error::Result;
use async_trait::async_trait;

/// Voice parameters applied to every synthesis request.
#[derive(Debug, Clone)]
pub struct VoiceOptions {
    /// Voice name (default: jane)
    pub voice: String,
    /// Voice role/emotion (default: good)
    pub role: String,
}

impl Default for VoiceOptions {
    fn default() -> Self {
        Self {
            voice: "jane".to_string(),
            role: "good".to_string(),
        }
    }
}

impl VoiceOptions {
    pub fn new(voice: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            voice: voice.into(),
            role: role.into(),
        }
    }
}

/// Speech synthesis backend - turns a piece of text into encoded audio bytes.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize text into encoded audio bytes (ogg/opus for SpeechKit).
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;

    /// Provider name for display.
    fn name(&self) -> &'static str;
}
