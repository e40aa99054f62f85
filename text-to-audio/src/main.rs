//! text2audio - Convert text documents to narrated audio using Yandex SpeechKit

mod audio;
mod config;
mod handlers;
mod pipeline;
mod text;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Settings;
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::{CancelFlag, SynthesisPipeline};
use speechkit_client::{
    CredentialSource, RateLimiter, SpeechKitProvider, SpeechProvider, TokenManager, VoiceOptions,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "text2audio")]
#[command(about = "Convert text documents to narrated audio using Yandex SpeechKit", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the input document (txt, md, docx, pdf)
    input: Option<PathBuf>,

    /// Output audio file path (default: <input-name>.<format>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output audio format (wav, mp3, ogg)
    #[arg(short, long, default_value = "wav")]
    format: String,

    /// Voice to synthesize with (overrides config)
    #[arg(long)]
    voice: Option<String>,

    /// Voice role/emotion (overrides config)
    #[arg(long)]
    role: Option<String>,

    /// Directory for temporary audio fragments
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Keep per-chunk fragments after merging
    #[arg(long, default_value_t = false)]
    keep_fragments: bool,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the default voice
    SetVoice {
        /// Voice name (e.g. jane, alena, filipp)
        name: String,
    },
    /// Set the default voice role
    SetRole {
        /// Role name (e.g. good, neutral, evil)
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.debug { "debug" } else { "info" }),
    )
    .format_timestamp_secs()
    .init();

    // Handle subcommands
    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let input_path = args.input.clone().ok_or_else(|| {
        anyhow::anyhow!("Input file path is required. Run 'text2audio --help' for usage.")
    })?;

    if !input_path.exists() {
        anyhow::bail!("Input file not found: {}", input_path.display());
    }

    let format = audio::OutputFormat::parse(&args.format).ok_or_else(|| {
        anyhow::anyhow!("Unsupported audio format: {} (use wav, mp3 or ogg)", args.format)
    })?;

    // Load configuration, with CLI flags taking precedence
    let mut settings = Settings::load().context("Failed to load configuration")?;
    if let Some(voice) = args.voice.clone() {
        settings.voice = voice;
    }
    if let Some(role) = args.role.clone() {
        settings.role = role;
    }

    let output_path = args.output.clone().unwrap_or_else(|| {
        let stem = input_path.file_stem().unwrap_or_default();
        input_path.with_file_name(format!("{}.{}", stem.to_string_lossy(), format.extension()))
    });

    if args.debug {
        eprintln!("Input: {}", input_path.display());
        eprintln!("Output: {}", output_path.display());
        eprintln!("Voice: {} ({})", settings.voice, settings.role);
        eprintln!("Max chunk size: {}", settings.max_chunk_size);
        eprintln!("Rate limit: {} req/s", settings.requests_per_second);
    }

    // Fail fast on credential problems before any text is processed
    eprintln!("Authorizing with Yandex Cloud...");
    let tokens = Arc::new(
        TokenManager::from_env().context("Yandex Cloud authorization is not configured")?,
    );
    tokens
        .token(false)
        .await
        .context("Authentication test failed")?;

    // Extract text
    eprintln!("Reading input: {}", input_path.display());
    let registry = handlers::HandlerRegistry::with_defaults();
    let raw_text = registry.extract_text(&input_path)?;
    eprintln!("Extracted {} characters", raw_text.chars().count());

    // Split into synthesis-sized chunks
    let chunks = text::chunker::split_text(&raw_text, settings.max_chunk_size)?;
    eprintln!("Text split into {} chunk(s)", chunks.len());

    // Build the synthesis pipeline
    let voice_options = VoiceOptions::new(&settings.voice, &settings.role);
    let provider: Arc<dyn SpeechProvider> = Arc::new(
        SpeechKitProvider::new(Arc::clone(&tokens), voice_options)
            .with_folder_id(std::env::var("YANDEX_FOLDER_ID").ok()),
    );
    let credentials: Arc<dyn CredentialSource> = tokens.clone();
    let limiter = Arc::new(RateLimiter::new(settings.requests_per_second));
    let fragment_dir = args.temp_dir.clone().unwrap_or_else(|| settings.fragment_dir());
    let synthesis = SynthesisPipeline::new(provider, credentials, limiter, &fragment_dir)
        .with_retries(settings.max_retries, settings.retry_delay());

    // Ctrl-C cancels between chunks; finished fragments are kept
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nInterrupt received, stopping after the current chunk...");
                cancel.cancel();
            }
        });
    }

    let progress = ProgressBar::new(chunks.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let report = synthesis
        .run(&chunks, &cancel, |p| {
            progress.set_position((p.completed + p.failed) as u64);
            if p.failed > 0 {
                progress.set_message(format!("{} failed", p.failed));
            }
        })
        .await?;
    progress.finish_and_clear();

    eprintln!(
        "Synthesized {}/{} chunks ({:.1}% success)",
        report.successful(),
        chunks.len(),
        report.success_rate() * 100.0
    );
    for (chunk, result) in chunks.iter().zip(report.results.iter()) {
        if let Err(failure) = result {
            eprintln!("  chunk {}: {failure}", chunk.index);
        }
    }
    if report.cancelled {
        eprintln!("Run was cancelled; merging the finished fragments only");
    }

    // Merge fragments into the final file
    let fragments = report.artifact_paths();
    eprintln!(
        "Merging {} fragment(s) into {}",
        fragments.len(),
        output_path.display()
    );
    audio::merge_and_convert(&fragments, &output_path, format)?;

    let metadata = std::fs::metadata(&output_path)?;
    let size_mb = metadata.len() as f64 / (1024.0 * 1024.0);
    match audio::audio_duration_secs(&output_path) {
        Ok(duration) => eprintln!(
            "Output: {} ({:.1} MB, {})",
            output_path.display(),
            size_mb,
            format_duration(duration)
        ),
        Err(e) => {
            log::debug!("could not probe output duration: {e}");
            eprintln!("Output: {} ({:.1} MB)", output_path.display(), size_mb);
        }
    }

    if !args.keep_fragments {
        cleanup_fragments(&fragments);
    }

    Ok(())
}

fn format_duration(total_secs: f64) -> String {
    let secs = total_secs.round() as u64;
    let (hours, mins, rest) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}:{mins:02}:{rest:02}")
    } else {
        format!("{mins}:{rest:02}")
    }
}

fn cleanup_fragments(paths: &[PathBuf]) {
    let mut removed = 0usize;
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => log::warn!("could not remove fragment {}: {e}", path.display()),
        }
    }
    log::debug!("removed {removed} temporary fragment(s)");
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load()?;
            println!("Configuration file: {:?}", Settings::config_path()?);
            println!();
            println!("max_chunk_size = {}", settings.max_chunk_size);
            println!("requests_per_second = {}", settings.requests_per_second);
            println!("max_retries = {}", settings.max_retries);
            println!("retry_delay_secs = {}", settings.retry_delay_secs);
            println!("voice = \"{}\"", settings.voice);
            println!("role = \"{}\"", settings.role);
            if let Some(dir) = &settings.temp_dir {
                println!("temp_dir = \"{}\"", dir.display());
            } else {
                println!("temp_dir = (system temp)");
            }
        }
        ConfigAction::SetVoice { name } => {
            let mut settings = Settings::load()?;
            settings.voice = name.clone();
            settings.save()?;
            println!("Default voice set to: {name}");
        }
        ConfigAction::SetRole { name } => {
            let mut settings = Settings::load()?;
            settings.role = name.clone();
            settings.save()?;
            println!("Default role set to: {name}");
        }
    }
    Ok(())
}
