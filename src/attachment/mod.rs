//! Attachment handling for incoming questions.
//!
//! A question may arrive with a file. The file is sniffed as text or binary
//! and turned into a prompt fragment: small text files are inlined, source
//! files and audio are referenced by path so the agent can hand them to the
//! executor or the transcription tool, and anything else is passed as an
//! opaque path.

mod sniffer;

pub use sniffer::{classify, classify_bytes, Classification, SNIFF_PREFIX_BYTES};

use crate::config::AttachmentSettings;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// A file attached to a question, classified once at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub path: PathBuf,
    /// Lowercased extension without the dot, empty if none.
    pub extension: String,
    pub classification: Classification,
}

impl Attachment {
    /// Build an attachment by sniffing the file at `path`.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            extension,
            classification: classify(path),
        }
    }
}

/// Turns attachments into prompt text.
#[derive(Debug, Clone, Default)]
pub struct AttachmentPresenter {
    settings: AttachmentSettings,
}

impl AttachmentPresenter {
    pub fn new(settings: AttachmentSettings) -> Self {
        Self { settings }
    }

    fn is_source(&self, attachment: &Attachment) -> bool {
        attachment
            .extension
            .eq_ignore_ascii_case(&self.settings.source_extension)
    }

    fn is_audio(&self, attachment: &Attachment) -> bool {
        is_audio_extension(&attachment.extension, &self.settings.audio_extensions)
    }

    /// Build the prompt fragment for the file at `path`.
    ///
    /// Fails only when a text file cannot be read in full.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn present(&self, path: &Path) -> Result<String> {
        let attachment = Attachment::from_path(path);
        debug!(
            extension = %attachment.extension,
            classification = %attachment.classification,
            "presenting attachment"
        );

        let display = attachment.path.display();

        let fragment = match attachment.classification {
            Classification::Text => {
                let bytes = std::fs::read(&attachment.path)?;
                if self.is_source(&attachment) {
                    format!("\nAttached source file: {}", display)
                } else {
                    format!("\nAttached File Content:\n{}", decode_ignoring_invalid(&bytes))
                }
            }
            Classification::Binary if self.is_audio(&attachment) => format!(
                "\nUse the 'transcribe_audio' tool to extract text from the audio file.\
                 \nAttached audio file: {}",
                display
            ),
            Classification::Binary => format!("\nAttached File Path: {}", display),
        };

        Ok(fragment)
    }

    /// Append the attachment fragment to `question`.
    ///
    /// Missing paths and read failures leave the question unchanged.
    pub fn augment(&self, question: &str, path: Option<&Path>) -> String {
        let Some(path) = path.filter(|p| p.exists()) else {
            return question.to_string();
        };

        match self.present(path) {
            Ok(fragment) => format!("{}{}", question, fragment),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read file");
                question.to_string()
            }
        }
    }
}

/// True if `extension` is one of `audio_extensions`, ignoring case.
pub fn is_audio_extension(extension: &str, audio_extensions: &[String]) -> bool {
    audio_extensions
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Decode UTF-8, dropping byte sequences that are not valid.
fn decode_ignoring_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
