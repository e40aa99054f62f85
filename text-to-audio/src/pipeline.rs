//! Resilient synthesis pipeline.
//!
//! Chunks are processed sequentially in index order: wait for a pacing
//! slot, synthesize, retry transient failures with exponential backoff
//! and a best-effort credential refresh between attempts. A chunk that
//! exhausts its retries fails permanently without aborting the run; the
//! run as a whole fails only when nothing was produced at all.

use crate::text::{TextChunk, cleaner};
use speechkit_client::{CredentialSource, RateLimiter, SpeechProvider};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Audio produced for one chunk.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub chunk_index: usize,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Why a chunk permanently failed.
#[derive(Error, Debug, Clone)]
pub enum ChunkFailure {
    #[error("chunk text is empty after synthesis cleanup")]
    EmptyAfterCleanup,
    #[error("synthesis failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
    #[error("run was cancelled before this chunk was attempted")]
    Cancelled,
    #[error("could not write audio fragment: {0}")]
    Io(String),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no chunks to synthesize")]
    NoChunks,
    #[error("could not prepare fragment directory {path}: {reason}")]
    FragmentDir { path: String, reason: String },
    #[error("all {total} chunks failed to synthesize; first error: {first_error}")]
    AllChunksFailed { total: usize, first_error: String },
}

/// Cooperative cancellation flag, checked between chunks. A chunk that
/// is already being synthesized always runs to completion.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress snapshot handed to the caller after every finished chunk.
#[derive(Debug, Clone, Copy)]
pub struct PipelineProgress {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Outcome of a pipeline run: one entry per input chunk, in index order.
#[derive(Debug)]
pub struct PipelineReport {
    pub results: Vec<Result<AudioArtifact, ChunkFailure>>,
    pub cancelled: bool,
}

impl PipelineReport {
    pub fn successful(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.successful()
    }

    pub fn success_rate(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.successful() as f64 / self.results.len() as f64
        }
    }

    /// Paths of the successful fragments, in chunk order.
    pub fn artifact_paths(&self) -> Vec<PathBuf> {
        self.results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|artifact| artifact.path.clone())
            .collect()
    }
}

pub struct SynthesisPipeline {
    provider: Arc<dyn SpeechProvider>,
    credentials: Arc<dyn CredentialSource>,
    limiter: Arc<RateLimiter>,
    max_retries: u32,
    retry_delay: Duration,
    fragment_dir: PathBuf,
}

impl SynthesisPipeline {
    pub fn new(
        provider: Arc<dyn SpeechProvider>,
        credentials: Arc<dyn CredentialSource>,
        limiter: Arc<RateLimiter>,
        fragment_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            credentials,
            limiter,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            fragment_dir: fragment_dir.into(),
        }
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Run synthesis over `chunks`, reporting progress after each one.
    ///
    /// The report holds exactly one result per chunk, in chunk order.
    /// Cancellation marks every unattempted chunk as `Cancelled` and
    /// returns the partial report instead of an error.
    pub async fn run<F>(
        &self,
        chunks: &[TextChunk],
        cancel: &CancelFlag,
        mut on_progress: F,
    ) -> Result<PipelineReport, PipelineError>
    where
        F: FnMut(PipelineProgress),
    {
        if chunks.is_empty() {
            return Err(PipelineError::NoChunks);
        }

        std::fs::create_dir_all(&self.fragment_dir).map_err(|e| PipelineError::FragmentDir {
            path: self.fragment_dir.display().to_string(),
            reason: e.to_string(),
        })?;

        log::info!(
            "synthesizing {} chunk(s) via {}",
            chunks.len(),
            self.provider.name()
        );

        let mut results = Vec::with_capacity(chunks.len());
        let mut completed = 0usize;
        let mut failed = 0usize;
        let mut cancelled = false;

        for chunk in chunks {
            if cancel.is_cancelled() {
                cancelled = true;
                failed += 1;
                results.push(Err(ChunkFailure::Cancelled));
                continue;
            }

            match self.synthesize_chunk(chunk).await {
                Ok(artifact) => {
                    completed += 1;
                    results.push(Ok(artifact));
                }
                Err(failure) => {
                    log::error!("chunk {} failed permanently: {failure}", chunk.index);
                    failed += 1;
                    results.push(Err(failure));
                }
            }

            on_progress(PipelineProgress {
                total: chunks.len(),
                completed,
                failed,
            });
        }

        if cancelled {
            log::warn!(
                "run cancelled: {completed} of {} chunk(s) synthesized",
                chunks.len()
            );
            return Ok(PipelineReport { results, cancelled });
        }

        if completed == 0 {
            let first_error = results
                .iter()
                .find_map(|r| r.as_ref().err())
                .map(|f| f.to_string())
                .unwrap_or_default();
            return Err(PipelineError::AllChunksFailed {
                total: chunks.len(),
                first_error,
            });
        }

        Ok(PipelineReport { results, cancelled })
    }

    async fn synthesize_chunk(&self, chunk: &TextChunk) -> Result<AudioArtifact, ChunkFailure> {
        let clean = cleaner::clean_for_synthesis(&chunk.text);
        if clean.is_empty() {
            return Err(ChunkFailure::EmptyAfterCleanup);
        }

        let mut last_error = String::new();
        for attempt in 1..=self.max_retries {
            self.limiter.acquire().await;

            match self.provider.synthesize(&clean).await {
                Ok(audio) => {
                    log::debug!(
                        "chunk {}: {} bytes on attempt {attempt}",
                        chunk.index,
                        audio.len()
                    );
                    return self.write_fragment(chunk.index, &audio);
                }
                Err(e) => {
                    log::warn!(
                        "chunk {} attempt {attempt}/{} failed: {e}",
                        chunk.index,
                        self.max_retries
                    );
                    last_error = e.to_string();
                    if attempt < self.max_retries {
                        let backoff = self.retry_delay * 2u32.pow(attempt - 1);
                        tokio::time::sleep(backoff).await;
                        // Best effort: a fresh token clears auth-related
                        // failures, and other failures lose nothing by it
                        if let Err(refresh_err) = self.credentials.refresh_token().await {
                            log::warn!(
                                "credential refresh failed, keeping current token: {refresh_err}"
                            );
                        }
                    }
                }
            }
        }

        Err(ChunkFailure::Exhausted {
            attempts: self.max_retries,
            last_error,
        })
    }

    fn write_fragment(&self, index: usize, audio: &[u8]) -> Result<AudioArtifact, ChunkFailure> {
        let path = self.fragment_dir.join(format!("chunk_{index:04}.ogg"));
        std::fs::write(&path, audio).map_err(|e| ChunkFailure::Io(e.to_string()))?;
        Ok(AudioArtifact {
            chunk_index: index,
            path,
            size_bytes: audio.len() as u64,
        })
    }
}
