//! Rendering of search results as prompt-ready text.

use crate::types::SearchResult;

/// Header line preceding the formatted sources.
pub const RESULTS_HEADER: &str = "Search results: \n\n";

/// Render results as numbered source blocks.
///
/// Each block carries the title, URL and content of one result, in input
/// order. An empty slice renders just [`RESULTS_HEADER`]. The output is
/// usually passed through [`crate::content::clean_formatted_output`].
pub fn format_web_results(results: &[SearchResult]) -> String {
    let mut out = String::from(RESULTS_HEADER);
    for (i, result) in results.iter().enumerate() {
        out.push_str(&format!("\n\n--- SOURCE {}: {} ---\n", i + 1, result.title));
        out.push_str(&format!("URL: {}\n\n", result.url));
        out.push_str(&format!("SUMMARY OF WEBPAGE:\n{}\n\n", result.content));
        out.push('\n');
    }
    out
}
