//! Mock speech provider for testing
//!
//! Configurable stand-in that simulates provider failures without any
//! network traffic, for exercising retry and ordering behavior.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, SpeechError};
use crate::provider::SpeechProvider;

/// Audio payload returned on success (content is irrelevant to callers).
const MOCK_AUDIO: &[u8] = b"OggS mock audio";

/// A mock provider for testing retry and ordering behavior.
pub struct MockProvider {
    /// Number of times to fail before succeeding (0 = always succeed)
    fail_count: AtomicUsize,
    /// Current call count
    call_count: AtomicUsize,
    /// Error to return on failure
    fail_with: Option<SpeechError>,
    /// When set, only texts containing this substring fail
    fail_matching: Option<String>,
    /// Texts received, in call order
    texts: Mutex<Vec<String>>,
}

impl MockProvider {
    /// Create a provider that fails `n` times with the given error, then succeeds.
    pub fn fails_then_succeeds(n: usize, error: SpeechError) -> Self {
        Self {
            fail_count: AtomicUsize::new(n),
            call_count: AtomicUsize::new(0),
            fail_with: Some(error),
            fail_matching: None,
            texts: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that always fails with the given error.
    pub fn always_fails(error: SpeechError) -> Self {
        Self::fails_then_succeeds(usize::MAX, error)
    }

    /// Create a provider that always succeeds.
    pub fn always_succeeds() -> Self {
        Self {
            fail_count: AtomicUsize::new(0),
            call_count: AtomicUsize::new(0),
            fail_with: None,
            fail_matching: None,
            texts: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that fails every request whose text contains
    /// `marker` and succeeds otherwise.
    pub fn fails_matching(marker: &str, error: SpeechError) -> Self {
        Self {
            fail_count: AtomicUsize::new(usize::MAX),
            call_count: AtomicUsize::new(0),
            fail_with: Some(error),
            fail_matching: Some(marker.to_string()),
            texts: Mutex::new(Vec::new()),
        }
    }

    /// Number of times `synthesize()` was called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Texts received so far, in call order.
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechProvider for MockProvider {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_string());

        if let Some(err) = self.fail_with.as_ref() {
            let should_fail = match self.fail_matching.as_deref() {
                Some(marker) => text.contains(marker),
                None => call_num < self.fail_count.load(Ordering::SeqCst),
            };
            if should_fail {
                return Err(err.clone());
            }
        }

        Ok(MOCK_AUDIO.to_vec())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overloaded() -> SpeechError {
        SpeechError::Api {
            message: "overloaded".to_string(),
            status_code: Some(503),
        }
    }

    #[tokio::test]
    async fn test_always_succeeds() {
        let provider = MockProvider::always_succeeds();
        let audio = provider.synthesize("hello").await.unwrap();
        assert!(!audio.is_empty());
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.texts(), vec!["hello"]);
    }

    #[tokio::test]
    async fn test_always_fails() {
        let provider = MockProvider::always_fails(overloaded());
        for _ in 0..3 {
            assert!(provider.synthesize("hello").await.is_err());
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fails_then_succeeds() {
        let provider = MockProvider::fails_then_succeeds(2, overloaded());
        assert!(provider.synthesize("a").await.is_err());
        assert!(provider.synthesize("a").await.is_err());
        assert!(provider.synthesize("a").await.is_ok());
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fails_matching() {
        let provider = MockProvider::fails_matching("poison", overloaded());
        assert!(provider.synthesize("clean text").await.is_ok());
        assert!(provider.synthesize("poison text").await.is_err());
        assert!(provider.synthesize("clean again").await.is_ok());
    }
}
