//! YouTube transcript loader backed by yt-dlp subtitles.

use super::TranscriptLoader;
use crate::error::{FerretError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Loads captions (uploaded or automatic) for a YouTube video as plain text.
pub struct YoutubeTranscriptLoader {
    video_id_regex: Regex,
    tag_regex: Regex,
    languages: String,
    scratch_dir: Option<PathBuf>,
}

impl YoutubeTranscriptLoader {
    pub fn new(languages: impl Into<String>) -> Self {
        // Matches various YouTube URL formats and bare video IDs
        let video_id_regex = Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/|youtube\.com/v/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex");

        let tag_regex = Regex::new(r"<[^>]*>").expect("Invalid regex");

        Self {
            video_id_regex,
            tag_regex,
            languages: languages.into(),
            scratch_dir: None,
        }
    }

    /// Download subtitles under `dir` instead of the system temp directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Extract video ID from a YouTube URL or bare ID.
    pub fn extract_video_id(&self, input: &str) -> Option<String> {
        let caps = self.video_id_regex.captures(input.trim())?;

        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    /// Download subtitles into `dir` without fetching any media.
    async fn download_subtitles(&self, video_id: &str, dir: &Path) -> Result<PathBuf> {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);
        let template = dir.join("%(id)s.%(ext)s");

        let output = Command::new("yt-dlp")
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-langs").arg(&self.languages)
            .arg("--sub-format").arg("vtt")
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--quiet")
            .arg("--output").arg(&template)
            .arg(&url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FerretError::ToolNotFound("yt-dlp".to_string())
                } else {
                    FerretError::TranscriptSource(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FerretError::TranscriptSource(format!(
                "yt-dlp failed for {}: {}",
                video_id,
                stderr.trim()
            )));
        }

        find_subtitle_file(dir, video_id)
    }

    /// Flatten WebVTT captions into a single line of text.
    ///
    /// Automatic captions repeat the previous line at the top of each cue,
    /// so consecutive duplicates are collapsed.
    pub fn vtt_to_text(&self, vtt: &str) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut in_block = false;

        let raw_lines: Vec<&str> = vtt.lines().map(str::trim).collect();

        for (idx, &line) in raw_lines.iter().enumerate() {
            let is_cue_id = raw_lines
                .get(idx + 1)
                .is_some_and(|next| next.contains("-->"));

            if line.is_empty() {
                in_block = false;
                continue;
            }
            if in_block {
                continue;
            }
            if line.starts_with("NOTE") || line.starts_with("STYLE") || line.starts_with("REGION") {
                in_block = true;
                continue;
            }
            if line.starts_with("WEBVTT")
                || line.starts_with("Kind:")
                || line.starts_with("Language:")
                || line.contains("-->")
                || is_cue_id
            {
                continue;
            }

            let text = decode_entities(&self.tag_regex.replace_all(line, ""));
            let text = text.trim();
            if text.is_empty() || lines.last().is_some_and(|prev| prev == text) {
                continue;
            }
            lines.push(text.to_string());
        }

        lines.join(" ")
    }
}

impl Default for YoutubeTranscriptLoader {
    fn default() -> Self {
        Self::new("en.*,en")
    }
}

#[async_trait]
impl TranscriptLoader for YoutubeTranscriptLoader {
    #[instrument(skip(self))]
    async fn load(&self, reference: &str) -> Result<String> {
        let video_id = self.extract_video_id(reference).ok_or_else(|| {
            FerretError::InvalidInput(format!("Invalid YouTube video ID or URL: {}", reference))
        })?;

        let temp_dir = match &self.scratch_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                tempfile::Builder::new().prefix("subs-").tempdir_in(dir)?
            }
            None => tempfile::tempdir()?,
        };
        let subtitle_path = self.download_subtitles(&video_id, temp_dir.path()).await?;
        debug!(path = %subtitle_path.display(), "subtitles downloaded");

        let vtt = tokio::fs::read_to_string(&subtitle_path).await?;
        Ok(self.vtt_to_text(&vtt))
    }
}

/// Locate the subtitle file yt-dlp wrote for `video_id`.
fn find_subtitle_file(dir: &Path, video_id: &str) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|ext| ext.to_str()) == Some("vtt"))
        .collect();

    candidates.sort();
    candidates.into_iter().next().ok_or_else(|| {
        FerretError::TranscriptNotFound(format!("No captions available for {}", video_id))
    })
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        let loader = YoutubeTranscriptLoader::default();

        assert_eq!(
            loader.extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            loader.extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            loader.extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            loader.extract_video_id("https://youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            loader.extract_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );

        assert_eq!(loader.extract_video_id("not-a-video-id"), None);
        assert_eq!(loader.extract_video_id(""), None);
    }

    #[test]
    fn test_vtt_to_text() {
        let vtt = "WEBVTT\nKind: captions\nLanguage: en\n\n\
                   NOTE generated\nby a tool\n\n\
                   1\n00:00:00.000 --> 00:00:02.000\nWelcome &amp; hello\n\n\
                   2\n00:00:02.000 --> 00:00:04.000 align:start\nWelcome &amp; hello\n<c>Isn't it</c><00:00:03.100> great?\n";

        let text = YoutubeTranscriptLoader::default().vtt_to_text(vtt);

        assert_eq!(text, "Welcome & hello Isn't it great?");
    }

    #[test]
    fn test_vtt_keeps_numeric_caption_text() {
        let vtt = "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nthe answer is\n\n\
                   00:00:01.000 --> 00:00:02.000\n42\n";

        let text = YoutubeTranscriptLoader::default().vtt_to_text(vtt);

        assert_eq!(text, "the answer is 42");
    }

    #[test]
    fn test_find_subtitle_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_subtitle_file(dir.path(), "dQw4w9WgXcQ").unwrap_err();
        assert!(matches!(err, FerretError::TranscriptNotFound(_)));
    }
}
