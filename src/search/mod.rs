//! Web search and keyword-based result reduction.
//!
//! A [`SearchProvider`] returns whatever the backend produced; [`reduce`]
//! then cuts it into fixed-size character chunks and keeps only the ones
//! that mention at least one important word, so a large page shrinks to an
//! excerpt the agent can read.

mod duckduckgo;
mod reducer;

pub use duckduckgo::{render_results, DuckDuckGoSearch};
pub use reducer::{
    no_match_sentinel, partition, reduce, SearchChunk, SearchPayload, SearchRecord,
    NO_RESULTS_SENTINEL,
};

use crate::config::SearchSettings;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Backend that answers a free-text query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchPayload>;
}

/// Search, then reduce the results to chunks mentioning `important_words`.
///
/// Waits `throttle` before each request to stay under provider rate limits.
/// Never fails: provider errors come back as an
/// `Error during optimized web search:` string.
#[instrument(skip(provider, important_words))]
pub async fn optimized_web_search(
    provider: &dyn SearchProvider,
    search_query: &str,
    important_words: &[String],
    batch_size: usize,
    throttle: Duration,
) -> String {
    if batch_size == 0 {
        return "Error during optimized web search: batch size must be greater than zero"
            .to_string();
    }

    if !throttle.is_zero() {
        tokio::time::sleep(throttle).await;
    }

    let payload = match provider.search(search_query).await {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "web search failed");
            return format!("Error during optimized web search: {}", e);
        }
    };

    let reduced = reduce(&payload, important_words, batch_size);
    info!(
        raw_chars = payload.flatten().chars().count(),
        reduced_chars = reduced.chars().count(),
        "search results reduced"
    );
    reduced
}

/// Provider configured from settings.
pub fn default_provider(settings: &SearchSettings) -> Result<DuckDuckGoSearch> {
    DuckDuckGoSearch::new(settings)
}
