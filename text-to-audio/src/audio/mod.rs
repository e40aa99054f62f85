//! Audio merging and format conversion.

pub mod merger;

pub use merger::{OutputFormat, audio_duration_secs, merge_and_convert};
