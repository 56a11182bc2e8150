//! Merging of several search responses by exact URL.
//!
//! Results that share a URL collapse into one entry: their content chunks
//! are unioned, the best score wins, and every other field keeps the value
//! from the first occurrence. Images are deduplicated by URL in first-seen
//! order and answers are concatenated in response order.

use std::collections::{HashMap, HashSet};

use crate::types::{
    DeduplicatedResultSet, ImageResult, SearchResponse, SearchResult, CHUNK_SEPARATOR,
};

/// Separator between answers from different responses.
pub const ANSWER_SEPARATOR: &str = "\n\n";

/// A result under construction, with the distinct chunks seen so far.
struct MergedEntry {
    result: SearchResult,
    chunks: Vec<String>,
    seen: HashSet<String>,
}

impl MergedEntry {
    fn new(result: &SearchResult) -> Self {
        let mut entry = Self {
            result: result.clone(),
            chunks: Vec::new(),
            seen: HashSet::new(),
        };
        entry.absorb_chunks(result);
        entry
    }

    /// Add chunks not already present, keeping first-seen order.
    fn absorb_chunks(&mut self, result: &SearchResult) {
        for chunk in result.chunks() {
            if self.seen.insert(chunk.to_owned()) {
                self.chunks.push(chunk.to_owned());
            }
        }
    }

    fn finish(mut self) -> SearchResult {
        self.result.content = self.chunks.join(CHUNK_SEPARATOR);
        self.result
    }
}

/// Merge per-query responses into one result set.
///
/// - `response_time` is the maximum over all responses.
/// - Results with an empty URL are dropped.
/// - `results` is sorted by score, highest first; equal scores keep the
///   order in which their URLs were first seen.
/// - `queries` lists each response's own `query` echo, in response order.
pub fn deduplicate_by_url(responses: &[SearchResponse]) -> DeduplicatedResultSet {
    let mut entries: Vec<MergedEntry> = Vec::new();
    let mut index_by_url: HashMap<String, usize> = HashMap::new();

    let mut seen_images: HashSet<String> = HashSet::new();
    let mut images: Vec<ImageResult> = Vec::new();
    let mut answers: Vec<&str> = Vec::new();
    let mut max_response_time = 0.0_f64;

    for response in responses {
        if response.response_time > max_response_time {
            max_response_time = response.response_time;
        }

        for image in &response.images {
            let key = image.url();
            if !key.is_empty() && seen_images.insert(key.to_owned()) {
                images.push(image.clone());
            }
        }

        if let Some(answer) = response.answer.as_deref().filter(|a| !a.is_empty()) {
            answers.push(answer);
        }

        for result in &response.results {
            if result.url.is_empty() {
                continue;
            }
            match index_by_url.get(&result.url) {
                Some(&idx) => {
                    let entry = &mut entries[idx];
                    entry.absorb_chunks(result);
                    if result.score > entry.result.score {
                        entry.result.score = result.score;
                    }
                }
                None => {
                    index_by_url.insert(result.url.clone(), entries.len());
                    entries.push(MergedEntry::new(result));
                }
            }
        }
    }

    let mut results: Vec<SearchResult> = entries.into_iter().map(MergedEntry::finish).collect();
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    tracing::debug!(
        responses = responses.len(),
        unique_results = results.len(),
        unique_images = images.len(),
        "merged search responses"
    );

    DeduplicatedResultSet {
        results,
        images: (!images.is_empty()).then_some(images),
        answer: (!answers.is_empty()).then(|| answers.join(ANSWER_SEPARATOR)),
        queries: responses.iter().map(|r| r.query.clone()).collect(),
        response_time: max_response_time,
    }
}
