//! Shared HTTP client construction.
//!
//! Provides a [`reqwest::Client`] with the configured per-call timeout and
//! a fixed User-Agent. Authentication is added per request by the client.

use std::time::Duration;

use crate::config::TavilyConfig;
use crate::error::SearchError;

/// User-Agent sent with every API request.
pub const USER_AGENT: &str = concat!("toolkit-search/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] for API calls.
///
/// The client has:
/// - Timeout from config
/// - The crate User-Agent
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &TavilyConfig) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}
