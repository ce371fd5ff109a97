// src/sitemap/resolve.rs
// =============================================================================
// This module turns a sitemap source into the flat list of page URLs to warm.
//
// How it works:
// 1. Fetch the sitemap text (read the file, or GET the URL)
// 2. If it contains <sitemap> entries it's an index: resolve every child
//    sitemap in listing order and concatenate their URLs
// 3. Otherwise it's a plain sitemap: return its <loc> values
//
// Resolution is sequential on purpose. The order of the final list is the
// order of the children in the index, then document order inside each child.
//
// Failure policy:
// - Any fetch failure aborts the whole resolve. A half-expanded index would
//   silently leave pages cold, so we refuse to return a partial list.
//
// Rust concepts:
// - BoxFuture: async fns can't call themselves directly (the future would
//   have infinite size), so the recursive step returns a boxed future
// - map_err: Converts library errors into our own WarmError
// =============================================================================

use super::extract::{extract_locs, is_sitemap_index};
use super::source::SitemapSource;
use crate::error::WarmError;
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use tracing::{debug, info, warn};

/// Browser-like user agent; some servers refuse sitemap requests without one
pub const SITEMAP_USER_AGENT: &str = "Mozilla/5.0 (compatible; sitemap-warmer)";

/// How many levels of nested sitemap indexes we expand
///
/// An index nested deeper than this is treated like a plain sitemap. This
/// also stops two indexes that list each other from looping forever.
const MAX_INDEX_DEPTH: usize = 3;

pub struct SitemapResolver {
    client: Client,
}

impl SitemapResolver {
    pub fn new() -> Result<Self, WarmError> {
        let client = Client::builder()
            .user_agent(SITEMAP_USER_AGENT)
            .build()
            .map_err(WarmError::HttpClient)?;

        Ok(Self { client })
    }

    // Resolves a sitemap (or sitemap index) into page URLs
    //
    // Returns: every <loc> of every leaf sitemap, duplicates included
    pub async fn resolve(&self, source: &SitemapSource) -> Result<Vec<String>, WarmError> {
        info!(%source, remote = source.is_remote(), "resolving sitemap");
        let urls = self.resolve_at_depth(source.clone(), 0).await?;
        info!(%source, count = urls.len(), "sitemap resolved");
        Ok(urls)
    }

    fn resolve_at_depth(
        &self,
        source: SitemapSource,
        depth: usize,
    ) -> BoxFuture<'_, Result<Vec<String>, WarmError>> {
        async move {
            let xml = self.fetch(&source).await?;
            let locs = extract_locs(&xml);

            if !is_sitemap_index(&xml) {
                debug!(%source, count = locs.len(), "leaf sitemap");
                return Ok(locs);
            }

            if depth >= MAX_INDEX_DEPTH {
                warn!(
                    %source,
                    depth,
                    "sitemap index nested too deeply, using its entries as page URLs"
                );
                return Ok(locs);
            }

            debug!(%source, children = locs.len(), "sitemap index");

            let mut urls = Vec::new();
            for loc in &locs {
                let child = source.child(loc)?;
                urls.extend(self.resolve_at_depth(child, depth + 1).await?);
            }

            Ok(urls)
        }
        .boxed()
    }

    // Reads the raw sitemap text from wherever it lives
    async fn fetch(&self, source: &SitemapSource) -> Result<String, WarmError> {
        match source {
            SitemapSource::LocalFile(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| WarmError::Fetch {
                        path: path.clone(),
                        source,
                    })
            }
            SitemapSource::RemoteUrl(url) => {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| WarmError::network(url.as_str(), e))?;

                if !response.status().is_success() {
                    return Err(WarmError::network(
                        url.as_str(),
                        format!("HTTP {}", response.status().as_u16()),
                    ));
                }

                response
                    .text()
                    .await
                    .map_err(|e| WarmError::network(url.as_str(), e))
            }
        }
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why not follow children concurrently?
//    - The final URL order must follow the index order
//    - Sitemap indexes are short; the page crawl is where time is spent
//
// 2. Why does a local index fetch https:// children remotely?
//    - Generated indexes always list absolute URLs, even when the index
//      file itself is read straight from the web root
// -----------------------------------------------------------------------------
