//! HTTP implementation of [`TavilyApi`].
//!
//! Every request is a JSON `POST` authenticated with a Bearer token and
//! always asks for the `usage` block so credits can be accounted for.
//! Non-success statuses are mapped to [`SearchError::Api`] with the
//! message extracted from the error body.

use serde::Serialize;
use serde_json::Value;

use crate::api::TavilyApi;
use crate::config::{CrawlParams, ExtractParams, SearchParams, TavilyConfig};
use crate::error::SearchError;
use crate::http::build_client;
use crate::orchestrator;
use crate::types::{CrawlOutput, ExtractOutput, FormattedSearch, SearchDedupResponse};

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(flatten)]
    params: &'a SearchParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunks_per_source: Option<u8>,
    include_usage: bool,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    urls: &'a [String],
    #[serde(flatten)]
    params: &'a ExtractParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunks_per_source: Option<u8>,
    include_usage: bool,
}

#[derive(Serialize)]
struct CrawlRequest<'a> {
    url: &'a str,
    #[serde(flatten)]
    params: &'a CrawlParams,
    include_usage: bool,
}

/// Client for the hosted search API.
pub struct TavilyClient {
    config: TavilyConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for TavilyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyClient")
            .field("base_url", &self.config.base_url)
            .field("timeout_seconds", &self.config.timeout_seconds)
            .field("max_retries", &self.config.max_retries)
            .finish()
    }
}

impl TavilyClient {
    /// Create a client after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for an invalid config, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: TavilyConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &TavilyConfig {
        &self.config
    }

    /// Run every query concurrently and merge the responses by URL.
    ///
    /// Uses the retry budget from the client config. See
    /// [`orchestrator::search::search_dedup`].
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `params` is invalid.
    pub async fn search_dedup(
        &self,
        queries: &[String],
        params: &SearchParams,
    ) -> Result<SearchDedupResponse, SearchError> {
        orchestrator::search::search_dedup(self, queries, params, self.config.max_retries).await
    }

    /// Run one query and render the results as LLM-ready text.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `params` is invalid.
    pub async fn search_and_format(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<FormattedSearch, SearchError> {
        orchestrator::search::search_and_format(self, query, params, self.config.max_retries)
            .await
    }

    /// Extract pages and clean their content.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `params` is invalid or `urls` is empty.
    pub async fn extract_and_clean(
        &self,
        urls: &[String],
        params: &ExtractParams,
    ) -> Result<ExtractOutput, SearchError> {
        orchestrator::extract::extract_and_clean(self, urls, params, self.config.max_retries)
            .await
    }

    /// Crawl from `url` and clean every page's content.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `params` is invalid.
    pub async fn crawl_and_clean(
        &self,
        url: &str,
        params: &CrawlParams,
    ) -> Result<CrawlOutput, SearchError> {
        orchestrator::extract::crawl_and_clean(self, url, params, self.config.max_retries).await
    }

    /// POST a JSON body to `path` and return the decoded JSON response.
    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, SearchError> {
        let url = self.config.endpoint(path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body_text));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::Parse(format!("invalid JSON from {path}: {e}")))
    }
}

impl TavilyApi for TavilyClient {
    async fn search(&self, query: &str, params: &SearchParams) -> Result<Value, SearchError> {
        tracing::trace!(query, "search request");
        let body = SearchRequest {
            query,
            params,
            chunks_per_source: params.effective_chunks(),
            include_usage: true,
        };
        self.post("search", &body).await
    }

    async fn extract(&self, urls: &[String], params: &ExtractParams) -> Result<Value, SearchError> {
        tracing::debug!(urls = urls.len(), "extract request");
        let body = ExtractRequest {
            urls,
            params,
            chunks_per_source: params.effective_chunks(),
            include_usage: true,
        };
        self.post("extract", &body).await
    }

    async fn crawl(&self, url: &str, params: &CrawlParams) -> Result<Value, SearchError> {
        tracing::debug!(url, "crawl request");
        let body = CrawlRequest {
            url,
            params,
            include_usage: true,
        };
        self.post("crawl", &body).await
    }
}

/// Map an HTTP error status to [`SearchError::Api`].
fn map_http_error(status: reqwest::StatusCode, body: &str) -> SearchError {
    SearchError::Api {
        status: status.as_u16(),
        message: extract_error_message(body),
    }
}

/// Pull a human-readable message out of an error body.
///
/// The API uses `{"detail": {"error": "..."}}`; plain `{"error": "..."}` and
/// `{"detail": "..."}` are accepted too. Falls back to the raw body.
fn extract_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_owned();
    };
    let detail = value.get("detail");
    detail
        .and_then(|d| d.get("error"))
        .or_else(|| value.get("error"))
        .or(detail)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| body.trim().to_owned())
}
