//! Client configuration and per-request parameters.
//!
//! [`TavilyConfig`] holds everything needed to reach the API (key, base URL,
//! timeout, retry budget). It is passed in explicitly; nothing here reads
//! the process environment. [`SearchParams`], [`ExtractParams`] and
//! [`CrawlParams`] are serialised straight into the request bodies.

use serde::{Serialize, Serializer};

use crate::error::SearchError;

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Connection settings for the search API.
///
/// The API key is redacted from the `Debug` representation.
#[derive(Clone)]
pub struct TavilyConfig {
    /// API key sent as a Bearer token.
    pub api_key: String,
    /// Base URL without a trailing path, e.g. `https://api.tavily.com`.
    pub base_url: String,
    /// Per-call HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Additional attempts after the first failure of a single call.
    pub max_retries: u32,
}

impl TavilyConfig {
    /// Create a config with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_seconds: 60,
            max_retries: 1,
        }
    }

    /// Set a custom base URL (used by tests to point at a mock server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the retry budget.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `api_key` must not be blank
    /// - `timeout_seconds` must be greater than 0
    /// - `base_url` must parse as an absolute http(s) URL
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::Config("api_key must not be empty".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| SearchError::Config(format!("invalid base_url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SearchError::Config(format!(
                "base_url must use http or https, got {}",
                parsed.scheme()
            )));
        }
        Ok(())
    }

    /// Join an endpoint path onto the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for TavilyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// How much effort the API spends per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    /// One generic snippet per result.
    Basic,
    /// Multiple relevant chunks per result, joined with `" [...] "`.
    #[default]
    Advanced,
}

/// Search category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    #[default]
    General,
    News,
    Finance,
}

/// Relative publish-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

/// Whether the API should generate an answer, and how thorough it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerMode {
    #[default]
    Off,
    Basic,
    Advanced,
}

impl Serialize for AnswerMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Off => serializer.serialize_bool(false),
            Self::Basic => serializer.serialize_str("basic"),
            Self::Advanced => serializer.serialize_str("advanced"),
        }
    }
}

/// Whether full page content is returned alongside each result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawContentMode {
    #[default]
    Off,
    Markdown,
    Text,
}

impl Serialize for RawContentMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Off => serializer.serialize_bool(false),
            Self::Markdown => serializer.serialize_str("markdown"),
            Self::Text => serializer.serialize_str("text"),
        }
    }
}

/// Output format for extracted and crawled pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    #[default]
    Markdown,
    Text,
}

/// Extraction effort for extract and crawl calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractDepth {
    #[default]
    Basic,
    /// Also retrieves tables and embedded content.
    Advanced,
}

/// Parameters shared by every query of a search fan-out.
#[derive(Debug, Clone, Serialize)]
pub struct SearchParams {
    pub search_depth: SearchDepth,
    pub topic: Topic,
    /// Results per query, 0..=20.
    pub max_results: u8,
    /// Chunks per result, 1..=3. Only sent with [`SearchDepth::Advanced`].
    #[serde(skip)]
    pub chunks_per_source: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    /// `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub include_images: bool,
    pub include_image_descriptions: bool,
    pub include_answer: AnswerMode,
    pub include_raw_content: RawContentMode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_domains: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_domains: Vec<String>,
    /// Boosts results from one country (general topic only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub auto_parameters: bool,
    pub include_favicon: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            search_depth: SearchDepth::Advanced,
            topic: Topic::General,
            max_results: 5,
            chunks_per_source: 3,
            time_range: None,
            start_date: None,
            end_date: None,
            include_images: false,
            include_image_descriptions: false,
            include_answer: AnswerMode::Off,
            include_raw_content: RawContentMode::Off,
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
            country: None,
            auto_parameters: false,
            include_favicon: false,
        }
    }
}

impl SearchParams {
    /// Maximum number of `include_domains` entries accepted by the API.
    pub const MAX_INCLUDE_DOMAINS: usize = 300;
    /// Maximum number of `exclude_domains` entries accepted by the API.
    pub const MAX_EXCLUDE_DOMAINS: usize = 150;

    /// Validates the parameter ranges.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results > 20 {
            return Err(SearchError::Config("max_results must be <= 20".into()));
        }
        if !(1..=3).contains(&self.chunks_per_source) {
            return Err(SearchError::Config(
                "chunks_per_source must be between 1 and 3".into(),
            ));
        }
        if self.include_domains.len() > Self::MAX_INCLUDE_DOMAINS {
            return Err(SearchError::Config(format!(
                "include_domains accepts at most {} entries",
                Self::MAX_INCLUDE_DOMAINS
            )));
        }
        if self.exclude_domains.len() > Self::MAX_EXCLUDE_DOMAINS {
            return Err(SearchError::Config(format!(
                "exclude_domains accepts at most {} entries",
                Self::MAX_EXCLUDE_DOMAINS
            )));
        }
        Ok(())
    }

    /// Chunk count to send, if the depth supports chunking.
    pub(crate) fn effective_chunks(&self) -> Option<u8> {
        (self.search_depth == SearchDepth::Advanced).then_some(self.chunks_per_source)
    }
}

/// Parameters for an extract call.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractParams {
    pub extract_depth: ExtractDepth,
    pub format: ContentFormat,
    /// When set, the API reranks and returns only the chunks relevant to it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Chunks per page, 1..=5. Only sent together with `query`.
    #[serde(skip)]
    pub chunks_per_source: u8,
    pub include_images: bool,
    pub include_favicon: bool,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self {
            extract_depth: ExtractDepth::Basic,
            format: ContentFormat::Markdown,
            query: None,
            chunks_per_source: 5,
            include_images: false,
            include_favicon: false,
        }
    }
}

impl ExtractParams {
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(1..=5).contains(&self.chunks_per_source) {
            return Err(SearchError::Config(
                "chunks_per_source must be between 1 and 5".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn effective_chunks(&self) -> Option<u8> {
        self.query.as_ref().map(|_| self.chunks_per_source)
    }
}

/// Parameters for a crawl call.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlParams {
    /// Natural-language guidance for which pages to follow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub max_depth: u8,
    pub max_breadth: u16,
    /// Total pages to process before stopping.
    pub limit: u16,
    pub extract_depth: ExtractDepth,
    pub format: ContentFormat,
    pub include_favicon: bool,
}

impl Default for CrawlParams {
    fn default() -> Self {
        Self {
            instructions: None,
            max_depth: 1,
            max_breadth: 20,
            limit: 50,
            extract_depth: ExtractDepth::Basic,
            format: ContentFormat::Markdown,
            include_favicon: false,
        }
    }
}

impl CrawlParams {
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_depth == 0 {
            return Err(SearchError::Config("max_depth must be greater than 0".into()));
        }
        if self.max_breadth == 0 {
            return Err(SearchError::Config(
                "max_breadth must be greater than 0".into(),
            ));
        }
        if self.limit == 0 {
            return Err(SearchError::Config("limit must be greater than 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = TavilyConfig::new("tvly-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_seconds, 60);
        assert_eq!(config.max_retries, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = TavilyConfig::new("tvly-secret-value");
        let debug = format!("{config:?}");
        assert!(!debug.contains("tvly-secret-value"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn empty_api_key_rejected() {
        let err = TavilyConfig::new("  ").validate().unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = TavilyConfig::new("k")
            .with_timeout_seconds(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn bad_base_url_rejected() {
        let err = TavilyConfig::new("k")
            .with_base_url("not a url")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("base_url"));

        let err = TavilyConfig::new("k")
            .with_base_url("ftp://example.com")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = TavilyConfig::new("k").with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.endpoint("search"), "http://127.0.0.1:9000/search");
    }

    #[test]
    fn default_search_params_valid() {
        let params = SearchParams::default();
        assert_eq!(params.max_results, 5);
        assert_eq!(params.search_depth, SearchDepth::Advanced);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn max_results_over_limit_rejected() {
        let params = SearchParams {
            max_results: 21,
            ..Default::default()
        };
        assert!(params.validate().unwrap_err().to_string().contains("max_results"));
    }

    #[test]
    fn chunks_per_source_range_enforced() {
        let params = SearchParams {
            chunks_per_source: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
        let params = SearchParams {
            chunks_per_source: 4,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn too_many_exclude_domains_rejected() {
        let params = SearchParams {
            exclude_domains: vec!["example.com".into(); 151],
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("exclude_domains"));
    }

    #[test]
    fn chunks_only_sent_for_advanced_depth() {
        let advanced = SearchParams::default();
        assert_eq!(advanced.effective_chunks(), Some(3));
        let basic = SearchParams {
            search_depth: SearchDepth::Basic,
            ..Default::default()
        };
        assert_eq!(basic.effective_chunks(), None);
    }

    #[test]
    fn search_params_serialise_omits_unset_options() {
        let json = serde_json::to_value(SearchParams::default()).expect("serialize");
        assert_eq!(json["search_depth"], "advanced");
        assert_eq!(json["topic"], "general");
        assert_eq!(json["include_answer"], false);
        assert_eq!(json["include_raw_content"], false);
        assert!(json.get("time_range").is_none());
        assert!(json.get("include_domains").is_none());
        assert!(json.get("chunks_per_source").is_none());
    }

    #[test]
    fn answer_and_raw_content_modes_serialise_as_strings() {
        let params = SearchParams {
            include_answer: AnswerMode::Advanced,
            include_raw_content: RawContentMode::Markdown,
            time_range: Some(TimeRange::Week),
            ..Default::default()
        };
        let json = serde_json::to_value(params).expect("serialize");
        assert_eq!(json["include_answer"], "advanced");
        assert_eq!(json["include_raw_content"], "markdown");
        assert_eq!(json["time_range"], "week");
    }

    #[test]
    fn extract_chunks_only_with_query() {
        let params = ExtractParams::default();
        assert_eq!(params.effective_chunks(), None);
        let params = ExtractParams {
            query: Some("pricing".into()),
            chunks_per_source: 2,
            ..Default::default()
        };
        assert_eq!(params.effective_chunks(), Some(2));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn crawl_zero_limit_rejected() {
        let params = CrawlParams {
            limit: 0,
            ..Default::default()
        };
        assert!(params.validate().unwrap_err().to_string().contains("limit"));
    }
}
