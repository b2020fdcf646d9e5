//! Pre-flight checks before operations that depend on external tools.
//!
//! Catches a missing interpreter, yt-dlp or API key up front instead of
//! letting the operation fail (or retry for a minute) midway.

use crate::config::Settings;
use crate::error::{FerretError, Result};
use std::process::Command;

/// Operations with external requirements.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Sandboxed execution needs the interpreter.
    Execute,
    /// Transcript fetching needs yt-dlp.
    Transcript,
    /// Audio transcription needs an OpenAI key.
    Transcribe,
    /// Search goes straight to HTTP.
    Search,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Execute => check_tool(&settings.executor.interpreter)?,
        Operation::Transcript => check_tool("yt-dlp")?,
        Operation::Transcribe => check_api_key()?,
        Operation::Search => {}
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(FerretError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(FerretError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if an external tool answers `--version`.
pub fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(FerretError::ToolFailed(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(FerretError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(FerretError::ToolFailed(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_search_no_requirements() {
        assert!(check(Operation::Search, &Settings::default()).is_ok());
    }

    #[test]
    fn test_missing_interpreter() {
        let mut settings = Settings::default();
        settings.executor.interpreter = "ferret-no-such-interpreter".to_string();

        let err = check(Operation::Execute, &settings).unwrap_err();

        assert!(matches!(err, FerretError::ToolNotFound(_)));
    }
}
