//! Utility functions and constants for HTML processing.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\n\r\x0C]+").unwrap());

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "center", "dd", "details",
    "dir", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "html", "li", "main", "menu", "nav", "ol",
    "p", "pre", "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Elements that produce no output at all
pub const IGNORED_ELEMENTS: &[&str] = &[
    "area", "audio", "base", "button", "canvas", "dialog", "embed", "head", "iframe", "input",
    "link", "map", "math", "meta", "noscript", "object", "optgroup", "option", "script", "select",
    "source", "style", "svg", "template", "textarea", "title", "track", "video",
];

/// URI schemes never turned into hyperlinks or fetched as images
const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:"];

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

pub fn is_ignored(tag: &str) -> bool {
    IGNORED_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Collapse runs of HTML whitespace to a single space
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").into_owned()
}

/// `true` when the text holds only HTML whitespace
pub fn is_blank(text: &str) -> bool {
    text.chars()
        .all(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C'))
}

/// Trim a link target and reject script-bearing schemes.
///
/// `data:` URIs are also rejected since they are never valid hyperlink
/// targets in a document package.
pub fn sanitize_href(href: &str) -> Option<&str> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let lower = href.to_ascii_lowercase();
    if UNSAFE_SCHEMES.iter().any(|s| lower.starts_with(s)) || lower.starts_with("data:") {
        return None;
    }
    Some(href)
}

/// Clean an attribute value (trim and handle empty)
pub fn clean_attribute(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
