//! Search and reduce commands.

use crate::cli::Output;
use crate::config::Settings;
use crate::search::{default_provider, optimized_web_search, reduce, SearchPayload};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Search the web and print the chunks that mention a keyword.
pub async fn run_search(
    query: &str,
    keywords: &[String],
    chunk_size: Option<usize>,
    settings: &Settings,
) -> Result<()> {
    let provider = default_provider(&settings.search)?;
    let chunk_size = chunk_size.unwrap_or(settings.search.chunk_size);

    let spinner = Output::spinner(&format!("Searching for \"{}\"...", query));
    let output = optimized_web_search(
        &provider,
        query,
        keywords,
        chunk_size,
        Duration::from_secs(settings.search.throttle_seconds),
    )
    .await;
    spinner.finish_and_clear();

    Output::result(&output);
    Ok(())
}

/// Reduce a saved result read from `input`, or stdin.
pub fn run_reduce(
    input: Option<&Path>,
    keywords: &[String],
    chunk_size: Option<usize>,
    settings: &Settings,
) -> Result<()> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let payload = parse_payload(&raw);
    let chunk_size = chunk_size.unwrap_or(settings.search.chunk_size);

    Output::result(&reduce(&payload, keywords, chunk_size));
    Ok(())
}

/// JSON records or a JSON string are decoded; anything else is plain text.
fn parse_payload(raw: &str) -> SearchPayload {
    serde_json::from_str(raw).unwrap_or_else(|_| SearchPayload::Text(raw.to_string()))
}
