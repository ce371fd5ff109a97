// src/crawl/outcome.rs
// =============================================================================
// The result of warming one URL.
//
// Only two things count as failures:
// - The server answered 404 Not Found
// - We never got an answer at all (connection refused, timeout, DNS, ...)
//
// Every other status, including 500s, counts as "warmed" and lands in
// 200-302.txt with its real status code.
// =============================================================================

use reqwest::StatusCode;
use serde::Serialize;
use std::fmt;

/// What came back for a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum CrawlStatus {
    /// The server answered with this HTTP status code
    Http(u16),
    /// No HTTP response (connection, timeout, DNS, TLS failure)
    TransportError,
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlStatus::Http(code) => write!(f, "{}", code),
            CrawlStatus::TransportError => write!(f, "ERR"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlOutcome {
    /// The URL that was requested (after domain rewriting)
    pub url: String,
    pub status: CrawlStatus,
    /// Response body, or a description of the failure for transport errors
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
    pub success: bool,
}

impl CrawlOutcome {
    pub fn from_response(url: String, status: StatusCode, body: String) -> Self {
        CrawlOutcome {
            url,
            status: CrawlStatus::Http(status.as_u16()),
            body,
            success: status != StatusCode::NOT_FOUND,
        }
    }

    pub fn transport_error(url: String, message: String) -> Self {
        CrawlOutcome {
            url,
            status: CrawlStatus::TransportError,
            body: message,
            success: false,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.success
    }
}
