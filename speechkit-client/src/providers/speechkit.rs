//! Yandex SpeechKit v1 REST synthesis provider.
//!
//! Sends form-encoded synthesis requests authorized with the current IAM
//! token and returns the raw ogg/opus payload. Token acquisition goes
//! through the shared [`TokenManager`], so an expiring token is refreshed
//! transparently before the request is issued.

use crate::auth::TokenManager;
use crate::error::{Result, SpeechError};
use crate::provider::{SpeechProvider, VoiceOptions};
use async_trait::async_trait;
use std::sync::Arc;

const SYNTHESIS_URL: &str = "https://tts.api.cloud.yandex.net/speech/v1/tts:synthesize";

/// Audio container requested from the API.
const AUDIO_FORMAT: &str = "oggopus";

pub struct SpeechKitProvider {
    tokens: Arc<TokenManager>,
    options: VoiceOptions,
    folder_id: Option<String>,
    endpoint: String,
    client: reqwest::Client,
}

impl SpeechKitProvider {
    pub fn new(tokens: Arc<TokenManager>, options: VoiceOptions) -> Self {
        Self {
            tokens,
            options,
            folder_id: None,
            endpoint: SYNTHESIS_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Set the cloud folder id, required when authorizing as a service
    /// account outside the folder the voice model lives in.
    pub fn with_folder_id(mut self, folder_id: Option<String>) -> Self {
        self.folder_id = folder_id;
        self
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SpeechProvider for SpeechKitProvider {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let token = self.tokens.token(false).await?;

        let mut form: Vec<(&str, &str)> = vec![
            ("text", text),
            ("voice", &self.options.voice),
            ("emotion", &self.options.role),
            ("format", AUDIO_FORMAT),
        ];
        if let Some(folder) = self.folder_id.as_deref() {
            form.push(("folderId", folder));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&token.value)
            .form(&form)
            .send()
            .await
            .map_err(|e| SpeechError::Api {
                message: format!("request failed: {e}"),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Api {
                message: body,
                status_code: Some(status.as_u16()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| SpeechError::Api {
            message: format!("failed to read audio payload: {e}"),
            status_code: None,
        })?;

        Ok(bytes.to_vec())
    }

    fn name(&self) -> &'static str {
        "Yandex SpeechKit"
    }
}
