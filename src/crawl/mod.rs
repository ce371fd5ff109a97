// src/crawl/mod.rs
// =============================================================================
// This module warms the URLs found in the sitemap.
//
// Features:
// - Fixed-size pool of parallel workers
// - One GET per URL, no retries
// - Optional domain rewriting before each request
// - Outcomes streamed to the collector in completion order
// =============================================================================

mod outcome;
mod pool;
mod rewrite;

pub use outcome::{CrawlOutcome, CrawlStatus};
pub use pool::{CrawlWorkerPool, DEFAULT_CONCURRENCY};
pub use rewrite::RewriteRule;
