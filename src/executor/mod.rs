//! Sandboxed execution of source files.
//!
//! Runs a single file with the configured interpreter in a fresh process
//! group, bounded by a wall-clock limit, and folds the outcome into one
//! string for the agent. Every failure is reported as text starting with
//! `Error:` so the caller never has to handle a second error channel.

mod process;

use crate::config::ExecutorSettings;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{info, instrument, warn};

/// Returned when a run produced nothing on either stream.
pub const NO_OUTPUT_SENTINEL: &str = "Script executed successfully with no output";

/// Raw outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub timed_out: bool,
}

impl ExecutionResult {
    /// Reduce a finished run to the single string handed back to the agent.
    ///
    /// Rules, first match wins:
    /// 1. non-zero exit with stderr: `Error: <stderr>`
    /// 2. stderr present: stdout followed by a `Warnings/Info:` section
    /// 3. the first stdout token that parses as an integer, else stdout,
    ///    else [`NO_OUTPUT_SENTINEL`]
    ///
    /// Rule 3 is a heuristic. Scripts usually print their answer as a bare
    /// number, but any integer printed earlier (a step counter, a year in a
    /// log line) wins instead.
    pub fn reduce(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();

        if !self.stderr.is_empty() && self.exit_code != 0 {
            return format!("Error: {}", stderr);
        }

        if !self.stderr.is_empty() {
            return format!("{}\nWarnings/Info: {}", stdout, stderr);
        }

        if let Some(number) = stdout.split_whitespace().find_map(canonical_integer) {
            return number;
        }

        if stdout.is_empty() {
            NO_OUTPUT_SENTINEL.to_string()
        } else {
            stdout.to_string()
        }
    }
}

/// Sentinel returned when a run hits its time limit.
pub fn timeout_sentinel(limit: Duration) -> String {
    format!("Error: Execution timed out after {} seconds", limit.as_secs())
}

/// Runs source files in isolated child processes.
#[derive(Debug, Clone, Default)]
pub struct SandboxedExecutor {
    settings: ExecutorSettings,
}

impl SandboxedExecutor {
    pub fn new(settings: ExecutorSettings) -> Self {
        Self { settings }
    }

    /// Execute `path` with the configured time limit.
    pub async fn execute(&self, path: &Path) -> String {
        self.execute_with_timeout(path, self.settings.timeout()).await
    }

    /// Execute `path`, killing it (and anything it spawned) after `limit`.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn execute_with_timeout(&self, path: &Path, limit: Duration) -> String {
        if let Err(message) = self.validate(path) {
            warn!(%message, "rejected execution request");
            return message;
        }

        let start = Instant::now();
        let mut cmd = Command::new(&self.settings.interpreter);
        cmd.arg(path);

        let result = match process::run_bounded(cmd, limit, self.settings.max_output_bytes).await {
            Ok(result) => result,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return format!("Error: Interpreter not found: {}", self.settings.interpreter);
            }
            Err(e) => return format!("Error: Subprocess error: {}", e),
        };

        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            exit_code = result.exit_code,
            timed_out = result.timed_out,
            stdout_bytes = result.stdout.len(),
            stderr_bytes = result.stderr.len(),
            "source file executed"
        );

        if result.timed_out {
            return timeout_sentinel(limit);
        }

        result.reduce()
    }

    fn validate(&self, path: &Path) -> std::result::Result<(), String> {
        if !path.exists() {
            return Err(format!("Error: File not found: {}", path.display()));
        }

        let has_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.settings.source_extension);

        if !has_extension {
            return Err(format!(
                "Error: File is not a {} file: {}",
                self.settings.language,
                path.display()
            ));
        }

        Ok(())
    }
}

/// Parse an integer literal the way a Python `int()` call would and render
/// it canonically: optional sign, ASCII digits, single underscores between
/// digits. Leading zeros and a `+` sign are dropped; `-0` becomes `0`.
///
/// Only ASCII `0-9` count as digits. Other Unicode decimal digits (fullwidth
/// `４２`, Arabic-Indic `٤٢`) are left as text, unlike Python's `int()`.
fn canonical_integer(token: &str) -> Option<String> {
    let (negative, body) = match token.as_bytes().first()? {
        b'-' => (true, &token[1..]),
        b'+' => (false, &token[1..]),
        _ => (false, token),
    };

    if body.is_empty() || body.starts_with('_') || body.ends_with('_') || body.contains("__") {
        return None;
    }

    let mut digits = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '0'..='9' => digits.push(c),
            '_' => {}
            _ => return None,
        }
    }

    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        return Some("0".to_string());
    }

    Some(if negative {
        format!("-{}", trimmed)
    } else {
        trimmed.to_string()
    })
}
