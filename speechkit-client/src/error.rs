use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SpeechError {
    #[error(
        "Yandex Cloud credentials not found. Set the {missing} environment variable(s)."
    )]
    MissingCredentials { missing: String },

    #[error("Unsupported key algorithm: {0}. Only RSA_2048 keys are supported.")]
    UnsupportedAlgorithm(String),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("IAM token exchange failed: {message}")]
    TokenExchange { message: String },

    #[error("SpeechKit API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    Api {
        message: String,
        status_code: Option<u16>,
    },
}

pub type Result<T> = std::result::Result<T, SpeechError>;
