// src/error.rs
// =============================================================================
// Fatal errors for a warming run.
//
// These are the failures that stop the program before any page is crawled:
// bad input, an unreadable sitemap file, or a sitemap that can't be fetched.
// Per-URL problems during the crawl (404s, connection failures) are NOT
// errors in this sense - they are recorded as data on each CrawlOutcome.
//
// Rust concepts:
// - thiserror: Derives std::error::Error and Display from attributes
// - #[source]: Keeps the underlying error in the error chain
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WarmError {
    /// Invalid or contradictory command-line input
    #[error("{0}")]
    Config(String),

    /// The local sitemap file could not be read
    #[error("could not read sitemap file {}: {source}", path.display())]
    Fetch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A remote sitemap (or a child of a sitemap index) could not be fetched
    #[error("could not fetch sitemap {url}: {reason}")]
    Network { url: String, reason: String },

    /// The HTTP client itself could not be built
    #[error("could not build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl WarmError {
    pub fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        WarmError::Network {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
