// src/sitemap/mod.rs
// =============================================================================
// This module finds the URLs to warm.
//
// Submodules:
// - source: Where a sitemap lives (file or URL) and how to reach its children
// - extract: Permissive <loc> scanning
// - resolve: Fetching sitemaps and expanding sitemap indexes
// =============================================================================

mod extract;
mod resolve;
mod source;

pub use resolve::SitemapResolver;
pub use source::SitemapSource;

pub(crate) use source::is_http;
