// src/util/text.rs
use html_escape::decode_html_entities;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BLOCK_TAG_REGEX: Regex =
        Regex::new(r"</?(p|div|br|li|h[1-6])[^>]*>").expect("Failed to compile block tag regex");
    static ref ANY_TAG_REGEX: Regex =
        Regex::new(r"<[^>]+>").expect("Failed to compile tag regex");
}

/// Upper-case the first character, leave the rest as is.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strip at most one leading and one trailing quote (`'` or `"`).
///
/// The two ends are handled independently, so `"abc` becomes `abc`.
pub fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s)
}

/// Extract the first line of plain text from HTML content.
///
/// Entities are decoded, block-level tags become line breaks, all other tags
/// are removed, and the first non-empty trimmed line is returned.
///
/// # Examples
///
/// ```
/// use blogmark::util::text::extract_first_line;
///
/// let html = "<h1>Flight deck study</h1><p>Second line</p>";
/// assert_eq!(extract_first_line(html), "Flight deck study");
/// ```
pub fn extract_first_line(html: &str) -> String {
    let decoded = decode_html_entities(html).to_string();
    let with_newlines = BLOCK_TAG_REGEX.replace_all(&decoded, "\n");
    let no_tags = ANY_TAG_REGEX.replace_all(&with_newlines, "");

    no_tags
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
        .to_string()
}
