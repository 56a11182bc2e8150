//! Concurrent multi-query search fan-out.
//!
//! Issues one retry-wrapped search per query, all at once, waits for every
//! call to settle, then merges the responses by URL. A query that fails
//! after its retries contributes an empty response; the batch never fails
//! because of the API.

use std::time::Instant;

use crate::api::TavilyApi;
use crate::config::SearchParams;
use crate::content::clean_formatted_output;
use crate::error::SearchError;
use crate::format::format_web_results;
use crate::types::{FormattedSearch, SearchDedupResponse, SearchResponse};
use crate::usage::TavilyUsage;

use super::dedup::deduplicate_by_url;
use super::retry::{call_with_retry, ApiResponse};

/// Search every query concurrently and merge the results.
///
/// # Pipeline
///
/// 1. Validate `params`
/// 2. Fan out one [`call_with_retry`] per query with [`futures::future::join_all`]
/// 3. Record credits and per-call time for each call in [`TavilyUsage`]
/// 4. Decode each payload; malformed items are skipped individually, and
///    failed calls or unusable payloads become empty responses
/// 5. Merge with [`deduplicate_by_url`]
///
/// # Errors
///
/// Returns [`SearchError::Config`] only if `params` is invalid. API failures
/// are absorbed: see [`SearchDedupResponse::failed_queries`].
pub async fn search_dedup<A: TavilyApi>(
    api: &A,
    queries: &[String],
    params: &SearchParams,
    max_retries: u32,
) -> Result<SearchDedupResponse, SearchError> {
    params.validate()?;
    let started = Instant::now();

    let calls = queries.iter().map(|query| {
        let query = query.as_str();
        call_with_retry(max_retries, move || api.search(query, params))
    });
    let outcomes = futures::future::join_all(calls).await;

    let mut usage = TavilyUsage::default();
    let mut failed_queries = 0usize;
    let mut responses: Vec<SearchResponse> = Vec::with_capacity(outcomes.len());

    for outcome in outcomes {
        usage.add_search(outcome.credits, outcome.response_time);
        let response = decode_search_response(outcome);
        if response.error.is_some() {
            failed_queries += 1;
        }
        responses.push(response);
    }

    if failed_queries > 0 {
        tracing::warn!(
            failed_queries,
            total_queries = queries.len(),
            "some queries contributed no results"
        );
    }

    let merged = deduplicate_by_url(&responses);
    let total_response_time = started.elapsed().as_secs_f64();
    tracing::debug!(
        queries = queries.len(),
        results = merged.results.len(),
        credits = usage.total_credits,
        total_response_time,
        "search fan-out complete"
    );

    Ok(SearchDedupResponse {
        merged,
        usage,
        total_response_time,
        failed_queries,
    })
}

/// Run a single query and render its results as cleaned LLM-ready text.
///
/// # Errors
///
/// Returns [`SearchError::Config`] only if `params` is invalid. If the call
/// fails after retries, the text holds just the header and `error` is set.
pub async fn search_and_format<A: TavilyApi>(
    api: &A,
    query: &str,
    params: &SearchParams,
    max_retries: u32,
) -> Result<FormattedSearch, SearchError> {
    params.validate()?;
    let started = Instant::now();

    let outcome = call_with_retry(max_retries, || api.search(query, params)).await;
    let mut usage = TavilyUsage::default();
    usage.add_search(outcome.credits, outcome.response_time);

    let response = decode_search_response(outcome);
    let text = clean_formatted_output(&format_web_results(&response.results));

    Ok(FormattedSearch {
        text,
        usage,
        total_response_time: started.elapsed().as_secs_f64(),
        error: response.error,
    })
}

/// Decode a retry outcome, degrading a payload that is not a response
/// object at all to an empty response carrying an error.
fn decode_search_response(outcome: ApiResponse) -> SearchResponse {
    match serde_json::from_value(outcome.into_data()) {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "undecodable search response, treating as empty");
            SearchResponse::failed(format!("invalid search response: {err}"))
        }
    }
}
