//! text2audio configuration management.
//!
//! Defaults live in an optional TOML file; the operational knobs can
//! additionally be overridden through environment variables, the same
//! channel the service-account credentials arrive through.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

// SpeechKit operational defaults
const DEFAULT_MAX_CHUNK_SIZE: usize = 4500;
const DEFAULT_REQUESTS_PER_SECOND: f64 = 35.0;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_SECS: f64 = 1.0;
const DEFAULT_VOICE: &str = "jane";
const DEFAULT_ROLE: &str = "good";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Maximum chunk size in characters
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Ceiling on synthesis requests per second
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Synthesis attempts per chunk before it fails permanently
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base retry delay in seconds; doubles with every attempt
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: f64,

    /// Voice to synthesize with
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Voice role (emotion)
    #[serde(default = "default_role")]
    pub role: String,

    /// Directory for per-chunk audio fragments. None means a
    /// text2audio subdirectory of the system temp dir.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

fn default_max_chunk_size() -> usize {
    DEFAULT_MAX_CHUNK_SIZE
}

fn default_requests_per_second() -> f64 {
    DEFAULT_REQUESTS_PER_SECOND
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_retry_delay_secs() -> f64 {
    DEFAULT_RETRY_DELAY_SECS
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            requests_per_second: default_requests_per_second(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            voice: default_voice(),
            role: default_role(),
            temp_dir: None,
        }
    }
}

impl Settings {
    /// Get the config file path: ~/.config/cli-programs/text2audio.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("text2audio.toml"))
    }

    /// Load settings from file (default if absent), then apply any
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut settings = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_parse::<usize>("MAX_CHUNK_SIZE") {
            self.max_chunk_size = v;
        }
        if let Some(v) = env_parse::<f64>("REQUESTS_PER_SECOND") {
            self.requests_per_second = v;
        }
        if let Some(v) = env_parse::<u32>("MAX_RETRIES") {
            self.max_retries = v;
        }
        if let Some(v) = env_parse::<f64>("RETRY_DELAY") {
            self.retry_delay_secs = v;
        }
        if let Ok(v) = std::env::var("DEFAULT_VOICE") {
            self.voice = v;
        }
        if let Ok(v) = std::env::var("DEFAULT_ROLE") {
            self.role = v;
        }
        if let Ok(v) = std::env::var("TEMP_DIR") {
            self.temp_dir = Some(PathBuf::from(v));
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay_secs.max(0.0))
    }

    /// Where per-chunk fragments are written during a run.
    pub fn fragment_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("text2audio"))
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("ignoring unparseable {name}={raw}");
            None
        }
    }
}
