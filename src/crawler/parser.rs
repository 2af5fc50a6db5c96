//! HTML parser for extracting links
//!
//! Links are the `href` values of anchor elements, in document order, with
//! exact duplicates removed. They are returned raw; resolving them against
//! the crawl scope is the caller's job.

use scraper::{Html, Selector};
use std::collections::HashSet;

/// Extracts the distinct anchor `href` values from an HTML document
///
/// The order is that of a depth-first walk of the document tree, keeping the
/// first occurrence of each value.
///
/// # Example
///
/// ```
/// use ripple_mirror::crawler::extract_links;
///
/// let html = r#"<a href="/a">A</a><p><a href="/b">B</a></p><a href="/a">again</a>"#;
/// assert_eq!(extract_links(html), vec!["/a", "/b"]);
/// ```
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    links_in(&document)
}

/// Same as [`extract_links`] for raw bytes, decoding invalid UTF-8 lossily
pub fn extract_links_from_bytes(bytes: &[u8]) -> Vec<String> {
    extract_links(&String::from_utf8_lossy(bytes))
}

fn links_in(document: &Html) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if seen.insert(href) {
                    links.push(href.to_string());
                }
            }
        }
    }

    links
}

/// Returns true if the bytes start like an HTML document
///
/// Leading whitespace and a UTF-8 byte order mark are ignored.
pub fn looks_like_html(bytes: &[u8]) -> bool {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let head: Vec<u8> = bytes[start..]
        .iter()
        .take(64)
        .map(u8::to_ascii_lowercase)
        .collect();

    head.starts_with(b"<!doctype html") || head.starts_with(b"<html")
}
