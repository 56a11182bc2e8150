//! # toolkit-search
//!
//! Concurrent multi-query web search with URL-keyed deduplication.
//!
//! This crate runs several search queries against a hosted search API at
//! once, waits for all of them, and merges the results into one ranked,
//! duplicate-free set. Every call is retried with exponential backoff and
//! its credits and latency are accounted for. Extract and crawl calls get
//! their page text cleaned of web boilerplate before it reaches an LLM.
//!
//! ## Design
//!
//! - One retry-wrapped call per query, fanned out concurrently
//! - Results merged by exact URL: chunk union, max score, first title wins
//! - A query that fails after its retries contributes nothing; the batch
//!   still succeeds
//! - Per-endpoint credit and timing accounting in [`TavilyUsage`]
//! - The API backend is a trait, so orchestration is testable offline
//!
//! ## Security
//!
//! - The API key is never printed by `Debug`
//! - Search queries are logged only at trace level

pub mod api;
pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod format;
pub mod http;
pub mod orchestrator;
pub mod types;
pub mod usage;

pub use api::TavilyApi;
pub use client::TavilyClient;
pub use config::{
    AnswerMode, ContentFormat, CrawlParams, ExtractDepth, ExtractParams, RawContentMode,
    SearchDepth, SearchParams, TavilyConfig, TimeRange, Topic,
};
pub use content::{clean_formatted_output, clean_raw_content};
pub use error::{Result, SearchError};
pub use format::format_web_results;
pub use orchestrator::dedup::deduplicate_by_url;
pub use orchestrator::retry::{call_with_retry, ApiResponse};
pub use types::{
    CrawlOutput, DeduplicatedResultSet, ExtractOutput, ExtractedPage, FailedExtraction,
    FormattedSearch, ImageResult, SearchDedupResponse, SearchResponse, SearchResult,
};
pub use usage::TavilyUsage;

/// Search every query concurrently and merge the results by URL.
///
/// Builds a [`TavilyClient`] from `config` and runs
/// [`TavilyClient::search_dedup`].
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` or `params` is invalid.
/// Individual query failures are logged and counted in
/// [`SearchDedupResponse::failed_queries`] but do not fail the batch.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> toolkit_search::Result<()> {
/// let config = toolkit_search::TavilyConfig::new("tvly-...");
/// let queries = vec!["rust async runtime".to_string(), "tokio vs smol".to_string()];
/// let response =
///     toolkit_search::search_dedup(&config, &queries, &Default::default()).await?;
/// for result in &response.merged.results {
///     println!("{:.2} {}", result.score, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search_dedup(
    config: &TavilyConfig,
    queries: &[String],
    params: &SearchParams,
) -> Result<SearchDedupResponse> {
    let client = TavilyClient::new(config.clone())?;
    client.search_dedup(queries, params).await
}

/// Extract pages and clean their content.
///
/// Convenience wrapper around [`TavilyClient::extract_and_clean`].
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` or `params` is invalid, or
/// `urls` is empty.
pub async fn extract_and_clean(
    config: &TavilyConfig,
    urls: &[String],
    params: &ExtractParams,
) -> Result<ExtractOutput> {
    let client = TavilyClient::new(config.clone())?;
    client.extract_and_clean(urls, params).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_dedup_validates_config_empty_key() {
        let config = TavilyConfig::new("  ");
        let result = search_dedup(&config, &["q".to_string()], &SearchParams::default()).await;
        assert!(result.unwrap_err().to_string().contains("api_key"));
    }

    #[tokio::test]
    async fn search_dedup_validates_config_zero_timeout() {
        let config = TavilyConfig::new("k").with_timeout_seconds(0);
        let result = search_dedup(&config, &["q".to_string()], &SearchParams::default()).await;
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn search_dedup_validates_params() {
        let config = TavilyConfig::new("k");
        let params = SearchParams {
            chunks_per_source: 0,
            ..Default::default()
        };
        let result = search_dedup(&config, &["q".to_string()], &params).await;
        assert!(result.unwrap_err().to_string().contains("chunks_per_source"));
    }

    #[tokio::test]
    async fn extract_and_clean_requires_urls() {
        let config = TavilyConfig::new("k");
        let result = extract_and_clean(&config, &[], &ExtractParams::default()).await;
        assert!(result.is_err());
    }
}
