//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use crate::transcription::is_api_key_configured;
use console::style;
use std::path::Path;
use std::process::Command;
use url::Url;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks. Returns an error if any check failed.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Ferret Doctor");
    println!();

    let sections = [
        (
            "External Tools",
            vec![
                check_tool(
                    &settings.executor.interpreter,
                    &format!("Needed to run {} files", settings.executor.language),
                ),
                check_tool("yt-dlp", install_hint_ytdlp()),
            ],
        ),
        ("API Configuration", vec![check_openai_api_key()]),
        (
            "Configuration",
            vec![check_config_file(config_path), check_search_endpoint(settings)],
        ),
    ];

    let mut errors = 0;
    let mut warnings = 0;
    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
            match check.status {
                CheckStatus::Error => errors += 1,
                CheckStatus::Warning => warnings += 1,
                CheckStatus::Ok => {}
            }
        }
        println!();
    }

    if errors > 0 {
        anyhow::bail!("{} check(s) failed", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Ferret is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => {
            // python prints its version to stderr on old releases
            let text = if output.stdout.is_empty() {
                output.stderr
            } else {
                output.stdout
            };
            let version: String = String::from_utf8_lossy(&text)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .chars()
                .take(50)
                .collect();

            CheckResult::ok(name, &version)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Transcription is optional, so a missing key is only a warning.
fn check_openai_api_key() -> CheckResult {
    if is_api_key_configured() {
        CheckResult::ok("OPENAI_API_KEY", "configured")
    } else {
        CheckResult::warning(
            "OPENAI_API_KEY",
            "not set (audio transcription unavailable)",
            "Set with: export OPENAI_API_KEY='sk-...'",
        )
    }
}

fn check_config_file(config_path: &Path) -> CheckResult {
    if !config_path.exists() {
        return CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: ferret config edit",
        );
    }

    match Settings::load_from(Some(config_path)) {
        Ok(_) => CheckResult::ok("Config file", &config_path.display().to_string()),
        Err(e) => CheckResult::error(
            "Config file",
            &format!("{} does not parse", config_path.display()),
            &e.to_string(),
        ),
    }
}

fn check_search_endpoint(settings: &Settings) -> CheckResult {
    match Url::parse(&settings.search.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            CheckResult::ok("Search endpoint", url.as_str())
        }
        Ok(url) => CheckResult::error(
            "Search endpoint",
            &format!("unsupported scheme '{}'", url.scheme()),
            "Set search.base_url to an http(s) URL",
        ),
        Err(e) => CheckResult::error(
            "Search endpoint",
            &format!("invalid URL: {}", e),
            "Set search.base_url to an http(s) URL",
        ),
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_missing_tool_is_error() {
        let result = check_tool("ferret-definitely-missing", "install it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.message, "not found");
    }

    #[test]
    fn test_search_endpoint_validation() {
        let mut settings = Settings::default();
        assert_eq!(check_search_endpoint(&settings).status, CheckStatus::Ok);

        settings.search.base_url = "ftp://example.com".to_string();
        assert_eq!(check_search_endpoint(&settings).status, CheckStatus::Error);

        settings.search.base_url = "not a url".to_string();
        assert_eq!(check_search_endpoint(&settings).status, CheckStatus::Error);
    }

    #[test]
    fn test_broken_config_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[executor\ntimeout_seconds = ").unwrap();

        assert_eq!(check_config_file(&path).status, CheckStatus::Error);
        assert_eq!(
            check_config_file(&dir.path().join("absent.toml")).status,
            CheckStatus::Warning
        );
    }
}
