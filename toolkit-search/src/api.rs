//! Trait for the search/extract/crawl API backend.
//!
//! [`crate::client::TavilyClient`] is the HTTP implementation. The
//! orchestrator only depends on this trait, so tests can substitute a fake
//! backend without a network.

use serde_json::Value;

use crate::config::{CrawlParams, ExtractParams, SearchParams};
use crate::error::SearchError;

/// A backend that answers search, extract and crawl calls with raw JSON.
///
/// Payloads are returned undecoded. Usage accounting reads
/// `usage.credits` from them, and decoding into typed responses happens
/// in the orchestrator where malformed shapes can be degraded instead of
/// failing the batch.
///
/// All implementations must be `Send + Sync` for concurrent fan-out.
pub trait TavilyApi: Send + Sync {
    /// Run one search query.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, times out, or the API
    /// rejects it.
    fn search(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> impl std::future::Future<Output = Result<Value, SearchError>> + Send;

    /// Extract page content from a list of URLs.
    ///
    /// # Errors
    ///
    /// Same as [`TavilyApi::search`].
    fn extract(
        &self,
        urls: &[String],
        params: &ExtractParams,
    ) -> impl std::future::Future<Output = Result<Value, SearchError>> + Send;

    /// Crawl outward from a root URL, extracting each page visited.
    ///
    /// # Errors
    ///
    /// Same as [`TavilyApi::search`].
    fn crawl(
        &self,
        url: &str,
        params: &CrawlParams,
    ) -> impl std::future::Future<Output = Result<Value, SearchError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::extract::{crawl_and_clean, extract_and_clean};
    use crate::orchestrator::search::search_dedup;
    use serde_json::json;

    /// A backend that echoes its inputs, or fails for queries containing "fail".
    struct EchoApi;

    impl TavilyApi for EchoApi {
        async fn search(&self, query: &str, _params: &SearchParams) -> Result<Value, SearchError> {
            if query.contains("fail") {
                return Err(SearchError::Http("mock failure".into()));
            }
            Ok(json!({
                "query": query,
                "results": [{"url": format!("https://{query}.example"), "content": query, "score": 0.5}],
                "usage": {"credits": 1}
            }))
        }

        async fn extract(
            &self,
            urls: &[String],
            _params: &ExtractParams,
        ) -> Result<Value, SearchError> {
            Ok(json!({
                "results": urls
                    .iter()
                    .map(|u| json!({"url": u, "raw_content": format!("Page at {u}\nShare")}))
                    .collect::<Vec<_>>(),
                "usage": {"credits": 1}
            }))
        }

        async fn crawl(&self, url: &str, _params: &CrawlParams) -> Result<Value, SearchError> {
            Ok(json!({"base_url": url, "results": [], "usage": {"credits": 2}}))
        }
    }

    #[tokio::test]
    async fn fan_out_runs_through_the_trait() {
        let queries = vec!["rust".to_string(), "please fail".to_string()];
        let response = search_dedup(&EchoApi, &queries, &SearchParams::default(), 0)
            .await
            .expect("valid params");

        assert_eq!(response.merged.results.len(), 1);
        assert_eq!(response.merged.results[0].url, "https://rust.example");
        assert_eq!(response.merged.queries, vec!["rust", ""]);
        assert_eq!(response.failed_queries, 1);
        assert_eq!(response.usage.search_count, 2);
        assert_eq!(response.usage.total_credits, 1);
    }

    #[tokio::test]
    async fn extract_runs_through_the_trait() {
        let urls = vec!["https://a.com".to_string()];
        let output = extract_and_clean(&EchoApi, &urls, &ExtractParams::default(), 0)
            .await
            .expect("valid params");
        assert_eq!(output.pages.len(), 1);
        assert_eq!(output.pages[0].url, "https://a.com");
        assert_eq!(output.pages[0].raw_content, "Page at");
        assert_eq!(output.usage.extract_count, 1);
    }

    #[tokio::test]
    async fn crawl_runs_through_the_trait() {
        let output = crawl_and_clean(&EchoApi, "https://docs.example.com", &CrawlParams::default(), 0)
            .await
            .expect("valid params");
        assert_eq!(output.base_url, "https://docs.example.com");
        assert!(output.pages.is_empty());
        assert_eq!(output.usage.total_credits, 2);
    }
}
