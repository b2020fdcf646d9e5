//! Transcribe command.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::transcription::{transcribe_audio, WhisperTranscriber};
use anyhow::Result;
use std::path::Path;

/// Transcribe an audio file and print the text.
pub async fn run_transcribe(audio: &Path, settings: &Settings) -> Result<()> {
    preflight::check(preflight::Operation::Transcribe, settings)?;

    let transcriber = WhisperTranscriber::new(&settings.transcription)?;

    let spinner = Output::spinner(&format!("Transcribing {}...", audio.display()));
    let result = transcribe_audio(&transcriber, audio, &settings.attachment.audio_extensions).await;
    spinner.finish_and_clear();

    println!("{}", result?);
    Ok(())
}
