// src/sitemap/source.rs
// =============================================================================
// Where a sitemap lives: a file on disk or a URL on the web.
//
// A sitemap index lists child sitemaps by location. How we reach a child
// depends on where its parent came from:
// - Remote parent: the child location is joined onto the parent URL, so
//   both absolute and relative <loc> values work
// - Local parent: "http(s)://..." children are fetched over the network
//   (that's what real indexes contain), "file://..." children and plain
//   paths are read from disk, relative to the parent file's directory
// =============================================================================

use crate::error::WarmError;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapSource {
    LocalFile(PathBuf),
    RemoteUrl(Url),
}

impl SitemapSource {
    /// Works out where a child sitemap listed in this (index) sitemap lives
    pub fn child(&self, loc: &str) -> Result<SitemapSource, WarmError> {
        match self {
            SitemapSource::RemoteUrl(base) => base
                .join(loc)
                .map(SitemapSource::RemoteUrl)
                .map_err(|e| WarmError::network(loc, format!("invalid sitemap location: {}", e))),

            SitemapSource::LocalFile(path) => match Url::parse(loc) {
                Ok(url) if is_http(&url) => Ok(SitemapSource::RemoteUrl(url)),
                Ok(url) if url.scheme() == "file" => url
                    .to_file_path()
                    .map(SitemapSource::LocalFile)
                    .map_err(|_| WarmError::network(loc, "not a local file location")),
                // Everything else is a path. This includes Windows drive
                // letters ("C:\..."), which parse as a one-letter scheme
                _ => {
                    let dir = path.parent().unwrap_or_else(|| Path::new(""));
                    Ok(SitemapSource::LocalFile(dir.join(loc)))
                }
            },
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SitemapSource::RemoteUrl(_))
    }
}

impl fmt::Display for SitemapSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SitemapSource::LocalFile(path) => write!(f, "{}", path.display()),
            SitemapSource::RemoteUrl(url) => write!(f, "{}", url),
        }
    }
}

pub(crate) fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
