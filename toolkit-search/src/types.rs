//! Payload and result types.
//!
//! Incoming payloads are decoded leniently: missing or `null` fields fall
//! back to empty values, scalar fields of the wrong type are normalised to
//! strings, and list items that still cannot be decoded are skipped on
//! their own. A malformed result never discards its siblings. Identity for
//! merging is always the URL string, compared exactly.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::usage::TavilyUsage;

/// Separator the API places between content chunks of one result.
pub const CHUNK_SEPARATOR: &str = " [...] ";

/// A single hit returned for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page URL; the deduplication key. Empty when the API omitted it.
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    /// One or more chunks separated by [`CHUNK_SEPARATOR`].
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
    /// Relevance score, higher is better.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub score: f64,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_content: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub favicon: Option<String>,
}

impl SearchResult {
    /// Split `content` into trimmed, non-empty chunks.
    pub fn chunks(&self) -> impl Iterator<Item = &str> {
        self.content
            .split(CHUNK_SEPARATOR)
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
    }
}

/// An image attached to a search response.
///
/// The API sends bare URL strings unless image descriptions were requested,
/// in which case it sends objects. Both decode into this enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageResult {
    /// A bare image URL.
    UrlOnly(String),
    /// An image URL with an optional generated description.
    Described {
        #[serde(default, deserialize_with = "lenient_string")]
        url: String,
        #[serde(
            default,
            deserialize_with = "lenient_opt_string",
            skip_serializing_if = "Option::is_none"
        )]
        description: Option<String>,
    },
}

impl ImageResult {
    /// The image URL, used as the deduplication key.
    pub fn url(&self) -> &str {
        match self {
            Self::UrlOnly(url) => url,
            Self::Described { url, .. } => url,
        }
    }

    /// The description, if the API provided one.
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::UrlOnly(_) => None,
            Self::Described { description, .. } => description.as_deref(),
        }
    }
}

/// The raw response to a single search query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The query as echoed back by the API. Empty if not echoed.
    #[serde(default, deserialize_with = "lenient_string")]
    pub query: String,
    #[serde(default, deserialize_with = "skip_invalid_items")]
    pub results: Vec<SearchResult>,
    #[serde(default, deserialize_with = "skip_invalid_items")]
    pub images: Vec<ImageResult>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub answer: Option<String>,
    /// Seconds the API reports spending on this query.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub response_time: f64,
    /// Set on the sentinel produced when a call exhausted its retries.
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
}

impl SearchResponse {
    /// An empty response standing in for a failed call.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Several search responses merged into one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeduplicatedResultSet {
    /// Unique by URL, sorted by score descending.
    pub results: Vec<SearchResult>,
    /// Unique by URL in first-seen order; `None` when no response had images.
    pub images: Option<Vec<ImageResult>>,
    /// All answers joined by a blank line; `None` when no response had one.
    pub answer: Option<String>,
    /// The `query` echo of every response, in response order.
    pub queries: Vec<String>,
    /// Slowest per-query response time in the batch.
    pub response_time: f64,
}

/// Output of a concurrent search fan-out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchDedupResponse {
    #[serde(flatten)]
    pub merged: DeduplicatedResultSet,
    /// Credits and call timings across every query in the batch.
    pub usage: TavilyUsage,
    /// Wall-clock seconds for the whole batch, fan-out plus merge.
    pub total_response_time: f64,
    /// Queries that exhausted their retries, or returned a payload that was
    /// not a response object, and so contributed nothing.
    pub failed_queries: usize,
}

/// One page returned by an extract or crawl call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPage {
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub raw_content: String,
    #[serde(default, deserialize_with = "skip_invalid_items")]
    pub images: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub favicon: Option<String>,
}

/// A URL the extract endpoint could not process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedExtraction {
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: String,
}

/// Raw extract response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractResponse {
    #[serde(default, deserialize_with = "skip_invalid_items")]
    pub results: Vec<ExtractedPage>,
    #[serde(default, deserialize_with = "skip_invalid_items")]
    pub failed_results: Vec<FailedExtraction>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub error: Option<String>,
}

/// Raw crawl response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CrawlResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub base_url: String,
    #[serde(default, deserialize_with = "skip_invalid_items")]
    pub results: Vec<ExtractedPage>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub error: Option<String>,
}

/// Output of an extract call with cleaned page content.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractOutput {
    pub pages: Vec<ExtractedPage>,
    pub failed: Vec<FailedExtraction>,
    pub usage: TavilyUsage,
    pub total_response_time: f64,
    /// Set when the call itself failed after retries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Output of a crawl call with cleaned page content.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlOutput {
    pub base_url: String,
    pub pages: Vec<ExtractedPage>,
    pub usage: TavilyUsage,
    pub total_response_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Search results rendered as LLM-ready text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormattedSearch {
    pub text: String,
    pub usage: TavilyUsage,
    pub total_response_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Render a scalar as a string; objects, arrays and `null` have none.
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accept a string or any scalar; anything else becomes empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .and_then(scalar_to_string)
        .unwrap_or_default())
}

/// Like [`lenient_string`], but absent instead of empty.
fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_to_string))
}

/// Decode a list item by item, dropping items that do not fit `T`.
///
/// `null` or a non-list value yields an empty list.
fn skip_invalid_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(other) => {
            tracing::warn!(value = %other, "expected a list, treating as empty");
            return Ok(Vec::new());
        }
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                tracing::warn!(error = %err, "skipping undecodable list item");
                None
            }
        })
        .collect())
}

/// Accept a number, a numeric string, or `null` (as 0.0).
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => n,
        Some(NumberOrString::Text(s)) => s.trim().parse().unwrap_or(0.0),
        None => 0.0,
    })
}
