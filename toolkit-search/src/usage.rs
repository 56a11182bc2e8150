//! Credit and timing accounting for API calls.
//!
//! Every call reports the credits it was charged and how long it took.
//! [`TavilyUsage`] sums both per endpoint. Summed times describe the
//! sequential cost of the calls; `max_response_time` describes the latency
//! of a concurrent batch, which finishes with its slowest call.
//!
//! # Examples
//!
//! ```
//! use toolkit_search::usage::TavilyUsage;
//!
//! let mut usage = TavilyUsage::default();
//! usage.add_search(1, 1.5);
//! usage.add_search(2, 2.3);
//! assert_eq!(usage.total_credits, 3);
//! assert_eq!(usage.search_count, 2);
//! assert!((usage.max_response_time - 2.3).abs() < f64::EPSILON);
//! ```

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Aggregate usage across one or more API calls.
///
/// Serialises an endpoint's count and summed time only when that endpoint
/// was called at least once, even if every call took zero time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TavilyUsage {
    /// Credits charged across all calls.
    pub total_credits: u64,
    pub search_count: u32,
    pub extract_count: u32,
    pub crawl_count: u32,
    /// Sum of per-call search times in seconds.
    pub search_response_time: f64,
    pub extract_response_time: f64,
    pub crawl_response_time: f64,
    /// Slowest single call seen.
    pub max_response_time: f64,
}

impl TavilyUsage {
    /// Record a search call.
    pub fn add_search(&mut self, credits: u64, response_time: f64) {
        self.search_count = self.search_count.saturating_add(1);
        self.search_response_time += response_time;
        self.record(credits, response_time);
    }

    /// Record an extract call.
    pub fn add_extract(&mut self, credits: u64, response_time: f64) {
        self.extract_count = self.extract_count.saturating_add(1);
        self.extract_response_time += response_time;
        self.record(credits, response_time);
    }

    /// Record a crawl call.
    pub fn add_crawl(&mut self, credits: u64, response_time: f64) {
        self.crawl_count = self.crawl_count.saturating_add(1);
        self.crawl_response_time += response_time;
        self.record(credits, response_time);
    }

    /// Total number of calls recorded across all endpoints.
    pub fn call_count(&self) -> u32 {
        self.search_count
            .saturating_add(self.extract_count)
            .saturating_add(self.crawl_count)
    }

    /// Accumulate another usage record into this one.
    pub fn merge(&mut self, other: &TavilyUsage) {
        self.total_credits = self.total_credits.saturating_add(other.total_credits);
        self.search_count = self.search_count.saturating_add(other.search_count);
        self.extract_count = self.extract_count.saturating_add(other.extract_count);
        self.crawl_count = self.crawl_count.saturating_add(other.crawl_count);
        self.search_response_time += other.search_response_time;
        self.extract_response_time += other.extract_response_time;
        self.crawl_response_time += other.crawl_response_time;
        self.max_response_time = self.max_response_time.max(other.max_response_time);
    }

    fn record(&mut self, credits: u64, response_time: f64) {
        self.total_credits = self.total_credits.saturating_add(credits);
        if response_time > self.max_response_time {
            self.max_response_time = response_time;
        }
    }
}

impl Serialize for TavilyUsage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let endpoints = [
            ("search_count", self.search_count, "search_response_time", self.search_response_time),
            ("extract_count", self.extract_count, "extract_response_time", self.extract_response_time),
            ("crawl_count", self.crawl_count, "crawl_response_time", self.crawl_response_time),
        ];

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("total_credits", &self.total_credits)?;
        for (count_key, count, time_key, time) in endpoints {
            if count > 0 {
                map.serialize_entry(count_key, &count)?;
                map.serialize_entry(time_key, &time)?;
            }
        }
        if self.call_count() > 0 {
            map.serialize_entry("max_response_time", &self.max_response_time)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        let usage = TavilyUsage::default();
        assert_eq!(usage.total_credits, 0);
        assert_eq!(usage.call_count(), 0);
    }

    #[test]
    fn add_search_sums_times_and_tracks_max() {
        let mut usage = TavilyUsage::default();
        usage.add_search(1, 1.5);
        usage.add_search(1, 2.3);
        usage.add_search(2, 1.8);
        assert_eq!(usage.total_credits, 4);
        assert_eq!(usage.search_count, 3);
        assert!((usage.search_response_time - 5.6).abs() < 1e-9);
        assert!((usage.max_response_time - 2.3).abs() < f64::EPSILON);
    }

    #[test]
    fn endpoints_counted_separately() {
        let mut usage = TavilyUsage::default();
        usage.add_search(1, 1.0);
        usage.add_extract(2, 3.0);
        usage.add_crawl(5, 4.0);
        assert_eq!(usage.search_count, 1);
        assert_eq!(usage.extract_count, 1);
        assert_eq!(usage.crawl_count, 1);
        assert_eq!(usage.call_count(), 3);
        assert_eq!(usage.total_credits, 8);
        assert!((usage.extract_response_time - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn failed_call_counts_without_credits() {
        let mut usage = TavilyUsage::default();
        usage.add_search(0, 0.0);
        assert_eq!(usage.search_count, 1);
        assert_eq!(usage.total_credits, 0);
    }

    #[test]
    fn merge_accumulates() {
        let mut a = TavilyUsage::default();
        a.add_search(1, 1.0);
        let mut b = TavilyUsage::default();
        b.add_extract(3, 2.5);
        b.add_search(1, 0.5);
        a.merge(&b);
        assert_eq!(a.total_credits, 5);
        assert_eq!(a.search_count, 2);
        assert_eq!(a.extract_count, 1);
        assert!((a.search_response_time - 1.5).abs() < f64::EPSILON);
        assert!((a.max_response_time - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn serialisation_omits_unused_endpoints() {
        let mut usage = TavilyUsage::default();
        usage.add_search(2, 1.0);
        let json = serde_json::to_value(&usage).expect("serialize");
        assert_eq!(json["total_credits"], 2);
        assert_eq!(json["search_count"], 1);
        assert!(json.get("extract_count").is_none());
        assert!(json.get("crawl_count").is_none());
        assert!(json.get("extract_response_time").is_none());
    }

    #[test]
    fn failed_only_batch_still_reports_endpoint_time() {
        let mut usage = TavilyUsage::default();
        usage.add_search(0, 0.0);
        let json = serde_json::to_value(&usage).expect("serialize");
        assert_eq!(json["search_count"], 1);
        assert_eq!(json["search_response_time"], 0.0);
        assert_eq!(json["max_response_time"], 0.0);
        assert!(json.get("extract_response_time").is_none());
    }

    #[test]
    fn empty_usage_serialises_credits_only() {
        let json = serde_json::to_value(TavilyUsage::default()).expect("serialize");
        assert_eq!(json, serde_json::json!({"total_credits": 0}));
    }

    #[test]
    fn serialised_usage_decodes_back() {
        let mut usage = TavilyUsage::default();
        usage.add_extract(2, 1.25);
        let json = serde_json::to_value(&usage).expect("serialize");
        let decoded: TavilyUsage = serde_json::from_value(json).expect("deserialize");
        assert_eq!(decoded, usage);
    }
}
