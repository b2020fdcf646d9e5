//! Configuration settings for Ferret.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub attachment: AttachmentSettings,
    pub executor: ExecutorSettings,
    pub transcript: TranscriptSettings,
    pub search: SearchSettings,
    pub transcription: TranscriptionSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for scratch files (subtitle downloads).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/ferret".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// How attached files are presented to the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentSettings {
    /// Extension of source files that are referenced rather than inlined.
    pub source_extension: String,
    /// Extensions routed to the transcription tool.
    pub audio_extensions: Vec<String>,
}

impl Default for AttachmentSettings {
    fn default() -> Self {
        Self {
            source_extension: "py".to_string(),
            audio_extensions: ["mp3", "wav", "flac", "m4a", "ogg", "opus", "webm"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Sandboxed execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorSettings {
    /// Interpreter binary used to run source files.
    pub interpreter: String,
    /// Extension a file must have to be executed.
    pub source_extension: String,
    /// Human-readable language name used in error messages.
    pub language: String,
    /// Wall-clock limit for a single run.
    pub timeout_seconds: u64,
    /// Maximum bytes captured per stream.
    pub max_output_bytes: usize,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            source_extension: "py".to_string(),
            language: "Python".to_string(),
            timeout_seconds: 180,
            max_output_bytes: 1024 * 1024,
        }
    }
}

/// Transcript fetching and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Delay before the second attempt, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound on a single wait, in milliseconds.
    pub max_delay_ms: u64,
    /// Maximum number of load attempts.
    pub max_attempts: u32,
    /// Maximum total time spent retrying, in seconds.
    pub max_elapsed_seconds: u64,
    /// Subtitle languages requested from yt-dlp.
    pub languages: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            max_attempts: 8,
            max_elapsed_seconds: 60,
            languages: "en.*,en".to_string(),
        }
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Characters per chunk when filtering results.
    pub chunk_size: usize,
    /// Maximum number of results kept from the provider.
    pub max_results: usize,
    /// Pause before each search request, in seconds.
    pub throttle_seconds: u64,
    /// Search endpoint.
    pub base_url: String,
    /// User agent sent with search requests.
    pub user_agent: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            max_results: 10,
            throttle_seconds: 10,
            base_url: "https://html.duckduckgo.com/html/".to_string(),
            user_agent: concat!("ferret/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Audio transcription settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model to use.
    pub model: String,
    /// Optional language hint (ISO-639-1).
    pub language: Option<String>,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            language: None,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&Path>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::FerretError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ferret")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}

impl ExecutorSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
