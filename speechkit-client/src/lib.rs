//! Yandex SpeechKit client library for the text-to-audio workspace
//!
//! Provides the pieces the converter binary needs to talk to the speech
//! service:
//! - IAM service-account authentication with proactive token refresh
//! - Request pacing against the shared API rate limit
//! - The synthesis provider interface (REST implementation + test mock)

pub mod auth;
pub mod error;
pub mod limiter;
pub mod provider;
pub mod providers;

pub use auth::{CredentialSource, IamToken, ServiceAccountKey, TokenManager};
pub use error::{Result, SpeechError};
pub use limiter::RateLimiter;
pub use provider::{SpeechProvider, VoiceOptions};
pub use providers::{MockProvider, SpeechKitProvider};
