//! Audio transcription.
//!
//! Audio attachments are referenced by path in the prompt; the agent turns
//! them into text by calling the `transcribe_audio` tool, which lands here.

mod whisper;

pub use whisper::{is_api_key_configured, WhisperTranscriber};

use crate::attachment::is_audio_extension;
use crate::error::{FerretError, Result};
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file to plain text.
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}

/// Check that `path` exists and carries one of `audio_extensions`.
pub fn validate_audio_path(path: &Path, audio_extensions: &[String]) -> Result<()> {
    if !path.is_file() {
        return Err(FerretError::InvalidInput(format!(
            "Audio file not found: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    if !is_audio_extension(extension, audio_extensions) {
        return Err(FerretError::InvalidInput(format!(
            "Not an audio file: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Validate `path` and transcribe it with `transcriber`.
pub async fn transcribe_audio(
    transcriber: &dyn Transcriber,
    path: &Path,
    audio_extensions: &[String],
) -> Result<String> {
    validate_audio_path(path, audio_extensions)?;
    transcriber.transcribe(path).await
}
