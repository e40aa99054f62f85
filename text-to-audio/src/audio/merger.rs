//! Merging synthesized fragments with FFmpeg.
//!
//! Fragments are concatenated with the concat demuxer and re-encoded in
//! one pass into the requested container.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Supported output containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Wav,
    Mp3,
    Ogg,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wav" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            "ogg" => Some(Self::Ogg),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
        }
    }

    /// FFmpeg encoder arguments for this container.
    fn encode_args(&self) -> &'static [&'static str] {
        match self {
            Self::Wav => &["-c:a", "pcm_s16le"],
            Self::Mp3 => &["-c:a", "libmp3lame", "-b:a", "192k"],
            Self::Ogg => &["-c:a", "libvorbis", "-q:a", "4"],
        }
    }
}

/// Build the concat demuxer file list, escaping single quotes in paths.
fn concat_list_content(inputs: &[PathBuf]) -> String {
    let mut content = String::new();
    for path in inputs {
        let escaped = path.to_string_lossy().replace('\'', "'\\''");
        content.push_str(&format!("file '{escaped}'\n"));
    }
    content
}

/// Concatenate the ordered `inputs` and encode the result as `format`.
pub fn merge_and_convert(inputs: &[PathBuf], output_path: &Path, format: OutputFormat) -> Result<PathBuf> {
    if inputs.is_empty() {
        bail!("no audio fragments to merge");
    }

    let scratch = TempDir::new().context("Failed to create scratch directory")?;
    let list_file = scratch.path().join("concat_list.txt");
    std::fs::write(&list_file, concat_list_content(inputs))
        .context("Failed to write concat list")?;

    log::debug!(
        "merging {} fragment(s) into {}",
        inputs.len(),
        output_path.display()
    );

    let output = Command::new("ffmpeg")
        .args(["-y", "-f", "concat", "-safe", "0", "-i"])
        .arg(&list_file)
        .args(format.encode_args())
        .arg(output_path)
        .output()
        .context("Failed to run ffmpeg (is it installed?)")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffmpeg concat failed: {}", stderr.trim());
    }

    Ok(output_path.to_path_buf())
}

/// Duration of an audio file in seconds, via ffprobe.
pub fn audio_duration_secs(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v", "quiet",
            "-show_entries", "format=duration",
            "-of", "csv=p=0",
        ])
        .arg(path)
        .output()
        .context("Failed to run ffprobe")?;

    if !output.status.success() {
        bail!("ffprobe failed on {}", path.display());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .trim()
        .parse::<f64>()
        .with_context(|| format!("unexpected ffprobe output: {stdout:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_list_one_line_per_fragment() {
        let inputs = vec![
            PathBuf::from("/tmp/chunk_0000.ogg"),
            PathBuf::from("/tmp/chunk_0001.ogg"),
        ];
        assert_eq!(
            concat_list_content(&inputs),
            "file '/tmp/chunk_0000.ogg'\nfile '/tmp/chunk_0001.ogg'\n"
        );
    }

    #[test]
    fn test_concat_list_escapes_single_quotes() {
        let inputs = vec![PathBuf::from("/tmp/it's here.ogg")];
        assert_eq!(
            concat_list_content(&inputs),
            "file '/tmp/it'\\''s here.ogg'\n"
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::parse("wav"), Some(OutputFormat::Wav));
        assert_eq!(OutputFormat::parse("MP3"), Some(OutputFormat::Mp3));
        assert_eq!(OutputFormat::parse("Ogg"), Some(OutputFormat::Ogg));
        assert_eq!(OutputFormat::parse("flac"), None);
    }

    #[test]
    fn test_encoder_args_match_container() {
        assert!(OutputFormat::Wav.encode_args().contains(&"pcm_s16le"));
        assert!(OutputFormat::Mp3.encode_args().contains(&"libmp3lame"));
        assert!(OutputFormat::Ogg.encode_args().contains(&"libvorbis"));
    }

    #[test]
    fn test_merge_rejects_empty_input() {
        let err = merge_and_convert(&[], Path::new("/tmp/out.wav"), OutputFormat::Wav).unwrap_err();
        assert!(err.to_string().contains("no audio fragments"));
    }
}
