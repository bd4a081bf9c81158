//! Text helpers shared by the scanners and the Markdown writers.
//!
//! - Comment stripping for TypeScript snippets
//! - Case-insensitive ordering on the final path segment
//! - Markdown table cell formatting for string lists

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

static RE_BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("Invalid block comment regex"));

static RE_LINE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)[ \t]*//.*$").expect("Invalid line comment regex"));

/// Remove `/* ... */` and `//` comments from a source snippet.
///
/// Block comments go first so a `//` inside a block comment cannot swallow
/// the closing `*/`. String literals are not tracked, so `//` inside a
/// quoted URL is removed as well.
pub fn remove_comments(content: &str) -> String {
    let without_blocks = RE_BLOCK_COMMENT.replace_all(content, "");
    RE_LINE_COMMENT.replace_all(&without_blocks, "").into_owned()
}

/// Final `/` or `\` separated segment of a path-like string.
pub fn basename(value: &str) -> &str {
    value
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(value)
}

/// Order two strings by their upper-cased basename.
pub fn compare_basenames(a: &str, b: &str) -> Ordering {
    basename(a)
        .to_uppercase()
        .cmp(&basename(b).to_uppercase())
}

/// Stable sort by upper-cased basename.
pub fn sort_by_basename<S: AsRef<str>>(items: &mut [S]) {
    items.sort_by(|a, b| compare_basenames(a.as_ref(), b.as_ref()));
}

/// Render a list as a single Markdown table cell.
///
/// Items are sorted by basename and joined with `,<br>`; an empty list
/// gives an empty cell. Pipes are escaped so they cannot end the cell.
pub fn array_to_markdown<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut sorted: Vec<&str> = items.iter().map(|s| s.as_ref()).collect();
    sort_by_basename(&mut sorted);
    sorted
        .iter()
        .map(|s| escape_markdown_cell(s))
        .collect::<Vec<_>>()
        .join(",<br>")
}

/// Escape `|` for use inside a Markdown table cell.
pub fn escape_markdown_cell(value: &str) -> String {
    value.replace('|', "&#124;")
}

/// Collapse every run of whitespace to a single space and trim the ends.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
