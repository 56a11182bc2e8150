//! Text cleanup for scraped page content before it is handed to an LLM.
//!
//! [`clean_raw_content`] runs an ordered list of regex substitutions over
//! markdown-ish page text: markdown images and navigation links, bare
//! URLs, HTML comments, line-level boilerplate (cookie notices, share
//! buttons, pagination, copyright footers, video player hints), separator
//! runs and excess whitespace. It is a heuristic: deterministic, but not
//! guaranteed to remove all boilerplate or to be idempotent.
//!
//! [`clean_formatted_output`] is a lighter pass for text that has already
//! been formatted for a prompt.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Link texts treated as site chrome; such links are dropped entirely.
const NAV_TERMS: &[&str] = &[
    "home",
    "menu",
    "search",
    "sign in",
    "sign out",
    "subscribe",
    "newsletter",
    "view",
    "more",
    "skip",
    "rss",
    "premium",
    "forums",
    "contact",
    "about",
    "privacy",
    "terms",
    "cookies",
    "advertise",
    "careers",
    "us edition",
    "uk edition",
    "au edition",
    "ca edition",
];

/// Link texts shorter than this many characters are dropped.
const MIN_LINK_TEXT_CHARS: usize = 4;

/// Whole-line boilerplate, matched case-insensitively per line.
const BOILERPLATE_LINES: &[&str] = &[
    r"^Open menu\s*$",
    r"^Close\s*$",
    r"^Search\s+Search\s+.*$",
    r"^Sign in\s*$",
    r"^Sign out\s*$",
    r"^View Profile\s*$",
    r"^Subscribe\s*$",
    r"^Newsletter\s*$",
    r"^RSS\s*$",
    r"^Premium\s*$",
    r"^Forums?\s*$",
    r"^Advertisement\s*$",
    r"^Sponsored\s*$",
    r"^Trending\s*$",
    r"^Popular\s*$",
    r"^Related\s*$",
    r"^Share\s*$",
    r"^Comments?\s*\(\d*\)\s*$",
    r"^See all comments.*$",
    r"^Show more comments\s*$",
    r"^View All \d+ Comments\s*$",
    r"^\d+ Comments?\s*$",
    r"^Comment from the forums\s*$",
    r"^Reply\s*$",
    r"^Read more\s*$",
    r"^Load more\s*$",
    r"^Show more\s*$",
    r"^View\s+\w+\s*$",
    r"^Skip to .*content.*$",
    r"^Jump to.*$",
    r"^Back to top\s*$",
    r"^Table of contents\s*$",
    r"^On this page\s*$",
    r"^In this article\s*$",
    r"^TOPICS?\s*$",
    r"^TAGS?\s*$",
    r"^Latest Videos?.*$",
    r"^Latest in .*$",
    r"^Latest News\s*$",
    r"^Don't miss.*$",
    r"^You may (?:also )?like\s*$",
    r"^Recommended\s*$",
    r"^More from.*$",
    r"^See also\s*$",
    r"^.*Edition.*flag of.*$",
    r"^Follow.*on Google News.*$",
    r"^Get .* Newsletter\s*$",
    r"^Stay On the Cutting Edge.*$",
    r"^By submitting your information.*$",
    r"^Contact me with news.*$",
    r"^Receive email from us.*$",
    r"^Terms and conditions\s*$",
    r"^Privacy policy\s*$",
    r"^Cookies? policy\s*$",
    r"^Accessibility Statement\s*$",
    r"^Advertise with us\s*$",
    r"^About us\s*$",
    r"^Careers\s*$",
    r"^Do not sell.*personal information.*$",
    r"^©.*Full.*Floor.*$",
    r"^©\s*\d{4}.*$",
    r"^All rights reserved.*$",
    r"^When you purchase through links.*$",
    r"^We may earn.*affiliate.*$",
    r"^Here's how it works.*$",
    r"^Keyboard Shortcuts.*$",
    r"^Press shift question mark.*$",
    r"^Shortcuts Open/Close.*$",
    r"^\s*Play/Pause\s+SPACE\s*$",
    r"^\s*Increase Volume.*$",
    r"^\s*Decrease Volume.*$",
    r"^\s*Seek Forward.*$",
    r"^\s*Seek Backward.*$",
    r"^\s*Captions On/Off.*$",
    r"^\s*Fullscreen.*$",
    r"^\s*Mute/Unmute.*$",
    r"^\s*Next Up\s*$",
    r"^\s*More Videos\s*$",
    r"^\s*PLAY SOUND\s*$",
    r"^\s*Live\s*$",
    r"^\s*\d{2}:\d{2}\s*$",
    r"^Add as a preferred source.*$",
    r"^.*part of Future.*Inc.*$",
    r"^Visit our corporate site.*$",
    r"^Contact Future's experts.*$",
];

/// Lines that are only a social platform name or share-button label.
const SOCIAL_LINES: &[&str] = &[
    "facebook",
    "twitter",
    "x",
    "instagram",
    "youtube",
    "linkedin",
    "reddit",
    "pinterest",
    "whatsapp",
    "flipboard",
    "email",
    "link",
    "copied",
    "share",
];

/// Substitutions applied after the boilerplate lines, in order.
const TAIL_RULES: &[(&str, &str)] = &[
    // Empty list bullets, number-only lines, dangling breadcrumb numbers.
    (r"(?m)^\s*[*+-]\s*$", ""),
    (r"(?m)^\s*\d+\.?\s*$", ""),
    (r"(?m)^\d+\.\s+$", ""),
    // Separator runs.
    (r"-{3,}", "--"),
    (r"={3,}", "=="),
    (r"_{3,}", "__"),
    (r"\*{3,}", "**"),
    (r"#{3,}", "##"),
    // Punctuation-only lines.
    (r"(?m)^\s*[|*+><#=_-]+\s*$", ""),
    // Empty table cells and rows.
    (r"\|\s*\|", "|"),
    (r"\n\s*\|\s*\n", "\n"),
    // Ellipsis markers.
    (r"\s*\[\.\.\.\]\s*", " "),
    (r"\s*\[…\]\s*", " "),
    (r"\s*\.\.\.\s*", " "),
    // Inline whitespace.
    (r" {2,}", " "),
    (r"\t+", " "),
    (r"\n{3,}", "\n\n"),
    (r"(?m)^\s+$", ""),
];

/// Substitutions for already-formatted prompt text, in order.
const FORMATTED_RULES: &[(&str, &str)] = &[
    (r"-{3,}", "--"),
    (r"={3,}", "=="),
    (r"_{3,}", "__"),
    (r"\n{2,}", "\n"),
    (r"\s*\[\.\.\.\]\s*", " "),
    (r"\s*\[…\]\s*", " "),
    (r" {2,}", " "),
    (r"\t+", " "),
    (r"#{2,}", "#"),
    (r"\|\s*\|", "|"),
    (r"\n\s*\|\s*\n", "\n"),
];

/// A compiled substitution.
struct Rule {
    regex: Regex,
    replacement: &'static str,
}

impl Rule {
    fn apply(&self, text: &str) -> String {
        self.regex.replace_all(text, self.replacement).into_owned()
    }
}

/// The compiled pipeline for [`clean_raw_content`].
struct RawContentRules {
    markdown_image: Option<Regex>,
    markdown_link: Option<Regex>,
    /// Bare URLs, HTML comments, checkbox markers, then line boilerplate.
    head: Vec<Rule>,
    tail: Vec<Rule>,
    blank_line_runs: Option<Regex>,
}

/// Compile a pattern, logging and skipping it if invalid.
fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::warn!(pattern, error = %err, "skipping invalid cleanup pattern");
            None
        }
    }
}

fn compile_rules(table: &[(&str, &'static str)]) -> Vec<Rule> {
    table
        .iter()
        .filter_map(|(pattern, replacement)| {
            compile(pattern).map(|regex| Rule {
                regex,
                replacement: *replacement,
            })
        })
        .collect()
}

fn raw_content_rules() -> &'static RawContentRules {
    static RULES: OnceLock<RawContentRules> = OnceLock::new();
    RULES.get_or_init(|| {
        let mut head_patterns: Vec<(String, &'static str)> = vec![
            (r"https?://[^\s)\]]+".to_owned(), ""),
            (r"(?s)<!--.*?-->".to_owned(), ""),
            (r"- \[[ x]\]\s*".to_owned(), ""),
        ];
        head_patterns.extend(
            BOILERPLATE_LINES
                .iter()
                .map(|line| (format!("(?mi){line}"), "")),
        );
        head_patterns.extend(
            SOCIAL_LINES
                .iter()
                .map(|name| (format!(r"(?mi)^\s*{name}\s*$"), "")),
        );
        let head = head_patterns
            .iter()
            .filter_map(|(pattern, replacement)| {
                compile(pattern).map(|regex| Rule {
                    regex,
                    replacement: *replacement,
                })
            })
            .collect();

        RawContentRules {
            markdown_image: compile(r"!\[(?:Image\s*\d*:?\s*)?[^\]]*\]\([^)]+\)"),
            markdown_link: compile(r"\[([^\]]*)\]\([^)]+\)"),
            head,
            tail: compile_rules(TAIL_RULES),
            blank_line_runs: compile(r"\n{3,}"),
        }
    })
}

fn formatted_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| compile_rules(FORMATTED_RULES))
}

/// Keep a link's anchor text unless it looks like navigation.
fn link_text(caps: &Captures<'_>) -> String {
    let text = caps.get(1).map_or("", |m| m.as_str());
    let normalised = text.trim().to_lowercase();
    if text.chars().count() < MIN_LINK_TEXT_CHARS || NAV_TERMS.contains(&normalised.as_str()) {
        String::new()
    } else {
        text.to_owned()
    }
}

/// Remove common web noise from scraped page text.
///
/// Returns an empty string for empty input. The same input always produces
/// the same output.
pub fn clean_raw_content(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }
    let rules = raw_content_rules();

    let mut cleaned = content.to_owned();
    if let Some(image) = &rules.markdown_image {
        cleaned = image.replace_all(&cleaned, "").into_owned();
    }
    if let Some(link) = &rules.markdown_link {
        cleaned = link.replace_all(&cleaned, link_text).into_owned();
    }
    for rule in rules.head.iter().chain(&rules.tail) {
        cleaned = rule.apply(&cleaned);
    }

    cleaned = cleaned
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    if let Some(runs) = &rules.blank_line_runs {
        cleaned = runs.replace_all(&cleaned, "\n\n").into_owned();
    }

    cleaned.trim().to_owned()
}

/// Light cleanup for text already formatted for a prompt.
///
/// Collapses separator runs and blank lines, drops `[...]` markers, empty
/// table cells and repeated heading hashes. Does not trim.
pub fn clean_formatted_output(formatted: &str) -> String {
    formatted_rules()
        .iter()
        .fold(formatted.to_owned(), |text, rule| rule.apply(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_patterns_compile() {
        let rules = raw_content_rules();
        assert!(rules.markdown_image.is_some());
        assert!(rules.markdown_link.is_some());
        assert!(rules.blank_line_runs.is_some());
        assert_eq!(
            rules.head.len(),
            3 + BOILERPLATE_LINES.len() + SOCIAL_LINES.len()
        );
        assert_eq!(rules.tail.len(), TAIL_RULES.len());
        assert_eq!(formatted_rules().len(), FORMATTED_RULES.len());
    }

    #[test]
    fn empty_input_returns_empty() {
        assert_eq!(clean_raw_content(""), "");
    }

    #[test]
    fn markdown_images_removed() {
        let input = "Intro ![Image 1: chart](https://x.com/a.png) text";
        assert_eq!(clean_raw_content(input), "Intro text");
    }

    #[test]
    fn markdown_links_become_anchor_text() {
        let input = "Read the [Rust Book](https://doc.rust-lang.org/book/) today";
        assert_eq!(clean_raw_content(input), "Read the Rust Book today");
    }

    #[test]
    fn navigation_links_dropped() {
        let input = "[Home](/) [Subscribe](/sub) Real content here";
        assert_eq!(clean_raw_content(input), "Real content here");
    }

    #[test]
    fn short_link_text_dropped() {
        let input = "[Go](https://go.dev) is short";
        assert_eq!(clean_raw_content(input), "is short");
    }

    #[test]
    fn bare_urls_removed() {
        let input = "See https://example.com/page?id=1 for details";
        assert_eq!(clean_raw_content(input), "See for details");
    }

    #[test]
    fn html_comments_removed_across_lines() {
        let input = "Before<!-- hidden\ncomment -->After";
        assert_eq!(clean_raw_content(input), "BeforeAfter");
    }

    #[test]
    fn checkbox_markers_removed() {
        let input = "- [ ] Task one\n- [x] Task two";
        assert_eq!(clean_raw_content(input), "Task one\nTask two");
    }

    #[test]
    fn boilerplate_lines_removed_case_insensitively() {
        let input = "ADVERTISEMENT\nActual paragraph.\nBack to top\n© 2024 Example Corp\nSkip to main content";
        assert_eq!(clean_raw_content(input), "Actual paragraph.");
    }

    #[test]
    fn social_share_lines_removed() {
        let input = "Share\nFacebook\nTwitter\nThe story continues.";
        assert_eq!(clean_raw_content(input), "The story continues.");
    }

    #[test]
    fn video_player_hints_removed() {
        let input = "Play/Pause SPACE\nIncrease Volume ↑\n01:35\nThe match report.";
        assert_eq!(clean_raw_content(input), "The match report.");
    }

    #[test]
    fn number_only_lines_removed() {
        let input = "1.\n2\nReal item";
        assert_eq!(clean_raw_content(input), "Real item");
    }

    #[test]
    fn separator_runs_collapsed() {
        let input = "Title\n=====\nBody ---------- end";
        assert_eq!(clean_raw_content(input), "Title\n\nBody -- end");
    }

    #[test]
    fn blank_line_runs_collapsed_to_two() {
        let input = "Para one.\n\n\n\n\nPara two.";
        assert_eq!(clean_raw_content(input), "Para one.\n\nPara two.");
    }

    #[test]
    fn ellipsis_markers_removed() {
        let input = "Chunk one [...] chunk two... more";
        assert_eq!(clean_raw_content(input), "Chunk one chunk two more");
    }

    #[test]
    fn empty_table_cells_collapsed() {
        assert_eq!(clean_raw_content("| a | | b |"), "| a | b |");
    }

    #[test]
    fn lines_trimmed() {
        let input = "   indented line   \n\ttabbed line";
        assert_eq!(clean_raw_content(input), "indented line\ntabbed line");
    }

    #[test]
    fn content_words_containing_nav_terms_survive() {
        let input = "The homepage redesign shipped.";
        assert_eq!(clean_raw_content(input), "The homepage redesign shipped.");
    }

    #[test]
    fn cleaning_is_deterministic() {
        let input = "# Heading\n\n[Menu](/m)\nBody with [a link](https://a.com) and https://b.com\n\n\n\nShare";
        assert_eq!(clean_raw_content(input), clean_raw_content(input));
    }

    #[test]
    fn formatted_output_collapses_blank_lines() {
        let input = "Search results: \n\n\n--- SOURCE 1: A ---\nURL: u\n\nbody";
        assert_eq!(
            clean_formatted_output(input),
            "Search results: \n-- SOURCE 1: A --\nURL: u\nbody"
        );
    }

    #[test]
    fn formatted_output_drops_markers_and_hashes() {
        let input = "## Title\tone [...] two  |  | end";
        assert_eq!(clean_formatted_output(input), "# Title one two | end");
    }
}
