//! OpenAI Whisper transcription.

use super::Transcriber;
use crate::config::TranscriptionSettings;
use crate::error::{FerretError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
    language: Option<String>,
}

impl WhisperTranscriber {
    pub fn new(settings: &TranscriptionSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client: Client::with_config(OpenAIConfig::default()).with_http_client(http_client),
            model: settings.model.clone(),
            language: settings.language.clone(),
        })
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        if !is_api_key_configured() {
            return Err(FerretError::OpenAI(
                "OPENAI_API_KEY is not set".to_string(),
            ));
        }

        let file_bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(file_name, file_bytes))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| FerretError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| FerretError::OpenAI(format!("Whisper API error: {}", e)))?;

        let text = response.text.trim().to_string();
        debug!(chars = text.len(), "audio transcribed");
        Ok(text)
    }
}

/// Check if the OpenAI API key is configured.
pub fn is_api_key_configured() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok_and(|key| !key.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_settings() {
        let transcriber = WhisperTranscriber::new(&TranscriptionSettings {
            model: "whisper-large".to_string(),
            language: Some("no".to_string()),
        })
        .unwrap();

        assert_eq!(transcriber.model, "whisper-large");
        assert_eq!(transcriber.language.as_deref(), Some("no"));
    }
}
