// src/sitemap/extract.rs
// =============================================================================
// This module pulls <loc> values out of sitemap documents.
//
// We deliberately don't run a full XML parser here. Sitemaps in the wild are
// often slightly broken (missing '>' on closing tags, stray whitespace), so
// we scan for the pattern <loc>...</loc> line by line:
// - The closing '>' is optional: "<loc>https://a</loc" still matches
// - A match never spans a line break, so a <loc> split over two lines
//   is skipped
// - Tags with no closing "</loc" on the same line are skipped
//
// Skipped tags are not errors; the document simply yields fewer URLs.
//
// Rust concepts:
// - OnceLock: Compile the regex once and reuse it on every call
// - Iterators: captures_iter() + filter_map() to build the result
// =============================================================================

use regex::Regex;
use std::sync::OnceLock;

/// Literal tag whose presence marks a document as a sitemap index
const SITEMAP_INDEX_MARKER: &str = "<sitemap>";

fn loc_pattern() -> &'static Regex {
    static LOC: OnceLock<Regex> = OnceLock::new();
    // The pattern is a constant, so it always compiles
    LOC.get_or_init(|| Regex::new(r"<loc>(.*?)</loc>?").unwrap())
}

// Returns true when the document lists other sitemaps instead of pages
//
// Example:
//   "<sitemapindex><sitemap><loc>...</loc></sitemap></sitemapindex>" -> true
//   "<urlset><url><loc>...</loc></url></urlset>"                      -> false
pub fn is_sitemap_index(xml: &str) -> bool {
    xml.contains(SITEMAP_INDEX_MARKER)
}

// Extracts every <loc> value in document order
//
// Values are trimmed and XML entities are decoded, so
//   "<loc> https://a.com/?x=1&amp;y=2 </loc>"
// becomes
//   "https://a.com/?x=1&y=2"
// Empty values are dropped.
pub fn extract_locs(xml: &str) -> Vec<String> {
    loc_pattern()
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|loc| !loc.is_empty())
        .map(decode_entities)
        .collect()
}

// Decodes the five entities XML predefines
// &amp; must go last, otherwise "&amp;lt;" would turn into "<"
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
