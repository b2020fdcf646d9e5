//! Video transcript retrieval with bounded retry and anchor seeking.
//!
//! The loader is an external, unreliable collaborator: every error it
//! returns is treated as transient and retried under a [`RetryPolicy`].
//! Once a transcript is in hand, [`seek_anchor`] drops everything before the
//! first mention of a phrase so the agent can "skip to where X is discussed".

mod retry;
mod youtube;

pub use retry::{
    retry, retry_with_history, AttemptOutcome, FetchAttempt, RetryPolicy, Step,
};
pub use youtube::YoutubeTranscriptLoader;

use crate::config::TranscriptSettings;
use crate::error::{FerretError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Source of raw transcript text for a video reference.
#[async_trait]
pub trait TranscriptLoader: Send + Sync {
    /// Load the full transcript for `reference` (a URL or video ID).
    async fn load(&self, reference: &str) -> Result<String>;
}

/// Fetches transcripts and trims them to an anchor phrase.
pub struct TranscriptFetcher {
    loader: Arc<dyn TranscriptLoader>,
    policy: RetryPolicy,
}

impl TranscriptFetcher {
    pub fn new(loader: Arc<dyn TranscriptLoader>, policy: RetryPolicy) -> Self {
        Self { loader, policy }
    }

    /// Fetcher backed by yt-dlp, configured from settings.
    pub fn youtube(settings: &TranscriptSettings, scratch_dir: PathBuf) -> Self {
        let loader = YoutubeTranscriptLoader::new(settings.languages.clone())
            .with_scratch_dir(scratch_dir);
        Self::new(Arc::new(loader), RetryPolicy::from(settings))
    }

    /// Load the transcript for `reference`, retrying on any loader error.
    ///
    /// An empty transcript counts as a failure. When the retry budget runs
    /// out the last error is returned.
    #[instrument(skip(self))]
    pub async fn load(&self, reference: &str) -> Result<String> {
        let (result, attempts) = retry_with_history(&self.policy, |attempt| {
            let loader = Arc::clone(&self.loader);
            async move {
                debug!(attempt, "loading transcript");
                let content = loader.load(reference).await?;
                if content.trim().is_empty() {
                    return Err(FerretError::TranscriptNotFound("Empty document".to_string()));
                }
                Ok(content)
            }
        })
        .await;

        info!(
            attempts = attempts.len(),
            success = result.is_ok(),
            "transcript load finished"
        );
        result
    }

    /// Load the transcript and return it from the first occurrence of
    /// `phrase` onward, or whole if the phrase never occurs.
    pub async fn fetch(&self, reference: &str, phrase: &str) -> Result<String> {
        let transcript = self.load(reference).await?;
        Ok(seek_anchor(&transcript, phrase))
    }
}

/// Lowercase a phrase and strip sentence punctuation (`.` and `?`).
pub fn normalize_phrase(phrase: &str) -> String {
    phrase.replace(['.', '?'], "").to_lowercase()
}

/// Return `transcript` from the first case-insensitive occurrence of the
/// normalized `phrase` to the end, or `transcript` unchanged if absent.
///
/// Matching happens on a lowercased copy; the returned slice keeps the
/// original casing. The excerpt is never lowercased, so callers that expect
/// lowercased text must compare case-insensitively.
pub fn seek_anchor(transcript: &str, phrase: &str) -> String {
    let needle = normalize_phrase(phrase);

    // (offset in lowered text, offset in original text) per original char
    let mut origins: Vec<(usize, usize)> = Vec::with_capacity(transcript.len());
    let mut lowered = String::with_capacity(transcript.len());
    for (idx, c) in transcript.char_indices() {
        origins.push((lowered.len(), idx));
        lowered.extend(c.to_lowercase());
    }

    let Some(pos) = lowered.find(&needle) else {
        return transcript.to_string();
    };

    let start = origins
        .partition_point(|(lowered_off, _)| *lowered_off <= pos)
        .checked_sub(1)
        .map(|i| origins[i].1)
        .unwrap_or(0);

    transcript[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct FlakyLoader {
        failures: u32,
        calls: AtomicU32,
        content: String,
    }

    #[async_trait]
    impl TranscriptLoader for FlakyLoader {
        async fn load(&self, _reference: &str) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(FerretError::TranscriptSource(format!("network hiccup {call}")))
            } else {
                Ok(self.content.clone())
            }
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::from_millis(1),
            factor: 2.0,
            max_delay: Duration::from_millis(5),
            max_attempts,
            max_elapsed: Duration::from_secs(5),
        }
    }

    fn fetcher(failures: u32, content: &str, max_attempts: u32) -> (TranscriptFetcher, Arc<FlakyLoader>) {
        let loader = Arc::new(FlakyLoader {
            failures,
            calls: AtomicU32::new(0),
            content: content.to_string(),
        });
        let fetcher = TranscriptFetcher::new(
            Arc::clone(&loader) as Arc<dyn TranscriptLoader>,
            fast_policy(max_attempts),
        );
        (fetcher, loader)
    }

    #[test]
    fn test_normalize_phrase() {
        assert_eq!(normalize_phrase("Isn't that hot?"), "isn't that hot");
        assert_eq!(normalize_phrase("Mr. Smith."), "mr smith");
    }

    #[test]
    fn test_seek_anchor_found() {
        let transcript = "Intro music. Then Teal'c says: Isn't that hot? Extremely.";
        assert_eq!(
            seek_anchor(transcript, "isn't that HOT?"),
            "Isn't that hot? Extremely."
        );
    }

    #[test]
    fn test_seek_anchor_keeps_transcript_casing() {
        assert_eq!(seek_anchor("Hello World Again", "world."), "World Again");
        assert_eq!(seek_anchor("Hello World Again", "WORLD"), "World Again");
    }

    #[test]
    fn test_seek_anchor_first_occurrence() {
        assert_eq!(seek_anchor("a bird, a Bird, a BIRD", "bird."), "bird, a Bird, a BIRD");
    }

    #[test]
    fn test_seek_anchor_absent_returns_unmodified() {
        let transcript = "Nothing To See Here";
        assert_eq!(seek_anchor(transcript, "penguins"), transcript);
    }

    #[test]
    fn test_seek_anchor_non_ascii() {
        let transcript = "Straße und ÄPFEL im Garten";
        assert_eq!(seek_anchor(transcript, "äpfel"), "ÄPFEL im Garten");
    }

    #[test]
    fn test_seek_anchor_empty_inputs() {
        assert_eq!(seek_anchor("", "anything"), "");
        assert_eq!(seek_anchor("whole text", "?."), "whole text");
    }

    #[tokio::test]
    async fn test_fetch_retries_then_seeks() {
        let (fetcher, loader) = fetcher(2, "Welcome back. Today we discuss penguins at length.", 5);

        let excerpt = fetcher
            .fetch("https://youtu.be/dQw4w9WgXcQ", "Penguins.")
            .await
            .unwrap();

        assert_eq!(excerpt, "penguins at length.");
        assert_eq!(loader.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_exhausted_propagates_error() {
        let (fetcher, loader) = fetcher(10, "unused", 3);

        let err = fetcher.fetch("dQw4w9WgXcQ", "anything").await.unwrap_err();

        assert!(matches!(err, FerretError::TranscriptSource(ref m) if m == "network hiccup 3"));
        assert_eq!(loader.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_transcript_is_retried() {
        let (fetcher, loader) = fetcher(0, "   ", 2);

        let err = fetcher.load("dQw4w9WgXcQ").await.unwrap_err();

        assert!(matches!(err, FerretError::TranscriptNotFound(_)));
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    }
}
