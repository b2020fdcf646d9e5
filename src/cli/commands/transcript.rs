//! Transcript command.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::transcript::TranscriptFetcher;
use anyhow::Result;

/// Fetch the transcript for `url` and print it from `phrase` onward.
pub async fn run_transcript(url: &str, phrase: &str, settings: &Settings) -> Result<()> {
    preflight::check(preflight::Operation::Transcript, settings)?;

    let fetcher = TranscriptFetcher::youtube(&settings.transcript, settings.temp_dir());

    let spinner = Output::spinner("Fetching transcript...");
    let result = fetcher.fetch(url, phrase).await;
    spinner.finish_and_clear();

    println!("{}", result?);
    Ok(())
}
