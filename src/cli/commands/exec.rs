//! Exec command - run a source file in the sandbox.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::executor::SandboxedExecutor;
use anyhow::Result;
use std::path::Path;
use std::time::Duration;

/// Run `path` and print the reduced output.
pub async fn run_exec(path: &Path, timeout: Option<u64>, settings: &Settings) -> Result<()> {
    if let Err(e) = preflight::check(preflight::Operation::Execute, settings) {
        Output::warning(&e.to_string());
    }

    let executor = SandboxedExecutor::new(settings.executor.clone());
    let limit = timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| settings.executor.timeout());

    let spinner = Output::spinner(&format!("Running {}...", path.display()));
    let output = executor.execute_with_timeout(path, limit).await;
    spinner.finish_and_clear();

    Output::result(&output);
    Ok(())
}
