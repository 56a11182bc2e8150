//! Extract and crawl calls with content cleaning.
//!
//! Each runs a single retry-wrapped call. Page content is passed through
//! [`clean_raw_content`] unless the extract was query-focused, in which case
//! the API already returns only the relevant chunks.

use std::time::Instant;

use crate::api::TavilyApi;
use crate::config::{CrawlParams, ExtractParams};
use crate::content::clean_raw_content;
use crate::error::SearchError;
use crate::types::{CrawlOutput, CrawlResponse, ExtractOutput, ExtractResponse, ExtractedPage};
use crate::usage::TavilyUsage;

use super::retry::call_with_retry;

/// Extract `urls` and clean each page's content.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `urls` is empty or `params` is invalid.
/// API failures are reported through [`ExtractOutput::error`].
pub async fn extract_and_clean<A: TavilyApi>(
    api: &A,
    urls: &[String],
    params: &ExtractParams,
    max_retries: u32,
) -> Result<ExtractOutput, SearchError> {
    if urls.is_empty() {
        return Err(SearchError::Config("at least one URL is required".into()));
    }
    params.validate()?;
    let started = Instant::now();

    let outcome = call_with_retry(max_retries, || api.extract(urls, params)).await;
    let mut usage = TavilyUsage::default();
    usage.add_extract(outcome.credits, outcome.response_time);

    let response: ExtractResponse = decode_or_failed(outcome.into_data(), |error| {
        ExtractResponse {
            error: Some(error),
            ..Default::default()
        }
    });

    let clean = params.query.is_none();
    let pages = response
        .results
        .into_iter()
        .map(|page| if clean { clean_page(page) } else { page })
        .collect::<Vec<_>>();

    tracing::debug!(
        pages = pages.len(),
        failed = response.failed_results.len(),
        "extract complete"
    );

    Ok(ExtractOutput {
        pages,
        failed: response.failed_results,
        usage,
        total_response_time: started.elapsed().as_secs_f64(),
        error: response.error,
    })
}

/// Crawl from `url` and clean every page's content.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `url` is blank or `params` is invalid.
/// API failures are reported through [`CrawlOutput::error`].
pub async fn crawl_and_clean<A: TavilyApi>(
    api: &A,
    url: &str,
    params: &CrawlParams,
    max_retries: u32,
) -> Result<CrawlOutput, SearchError> {
    if url.trim().is_empty() {
        return Err(SearchError::Config("crawl URL must not be empty".into()));
    }
    params.validate()?;
    let started = Instant::now();

    let outcome = call_with_retry(max_retries, || api.crawl(url, params)).await;
    let mut usage = TavilyUsage::default();
    usage.add_crawl(outcome.credits, outcome.response_time);

    let response: CrawlResponse = decode_or_failed(outcome.into_data(), |error| CrawlResponse {
        error: Some(error),
        ..Default::default()
    });

    let pages: Vec<ExtractedPage> = response.results.into_iter().map(clean_page).collect();
    tracing::debug!(pages = pages.len(), "crawl complete");

    Ok(CrawlOutput {
        base_url: if response.base_url.is_empty() {
            url.to_owned()
        } else {
            response.base_url
        },
        pages,
        usage,
        total_response_time: started.elapsed().as_secs_f64(),
        error: response.error,
    })
}

fn clean_page(mut page: ExtractedPage) -> ExtractedPage {
    page.raw_content = clean_raw_content(&page.raw_content);
    page
}

fn decode_or_failed<T, F>(data: serde_json::Value, failed: F) -> T
where
    T: serde::de::DeserializeOwned,
    F: FnOnce(String) -> T,
{
    serde_json::from_value(data).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "undecodable response, treating as empty");
        failed(format!("invalid response: {err}"))
    })
}
