//! Error types for Ferret.

use thiserror::Error;

/// Library-level error type for Ferret operations.
#[derive(Error, Debug)]
pub enum FerretError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcript source error: {0}")]
    TranscriptSource(String),

    #[error("Transcript not available: {0}")]
    TranscriptNotFound(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Tool error: {0}")]
    Tool(String),
}

/// Result type alias for Ferret operations.
pub type Result<T> = std::result::Result<T, FerretError>;
