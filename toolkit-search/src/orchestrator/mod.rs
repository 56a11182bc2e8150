//! Search orchestrator: retrying calls, concurrent fan-out, URL dedup.
//!
//! This module wraps every API call in a bounded retry loop, fans search
//! queries out concurrently, merges their responses by exact URL with
//! chunk-level content union, and cleans extracted or crawled pages.

pub mod dedup;
pub mod extract;
pub mod retry;
pub mod search;
