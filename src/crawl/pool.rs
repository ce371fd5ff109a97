// src/crawl/pool.rs
// =============================================================================
// This module warms URLs with a fixed-size pool of workers.
//
// Key functionality:
// - Spawns N worker tasks on the multi-threaded tokio runtime
// - Workers pull URLs from a shared queue until it is empty
// - Each URL gets exactly one GET request (no retries)
// - Each result is sent to the collector over a channel as soon as it's ready
//
// Ordering:
// - Results arrive in completion order, NOT in sitemap order
//
// Rust concepts:
// - tokio::spawn: Runs a task that may execute on any runtime thread
// - Arc<Mutex<...>>: Shared, lock-protected state between tasks
// - mpsc channels: Send values from many producers to one consumer
// =============================================================================

use super::outcome::CrawlOutcome;
use super::rewrite::RewriteRule;
use crate::error::WarmError;
use anyhow::{Context, Result};
use futures::future::join_all;
use reqwest::Client;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, warn};

/// User agent sent with every warming request
pub const CRAWLER_USER_AGENT: &str = "SitemapCacheWarmer";

/// Worker count used when none is configured
pub const DEFAULT_CONCURRENCY: usize = 10;

type UrlQueue = Arc<Mutex<VecDeque<String>>>;

pub struct CrawlWorkerPool {
    client: Client,
    concurrency: usize,
}

impl CrawlWorkerPool {
    // Creates a pool with a fixed number of workers
    //
    // No request timeout is set; reqwest's default (none) applies.
    pub fn new(concurrency: usize) -> Result<Self, WarmError> {
        let client = Client::builder()
            .user_agent(CRAWLER_USER_AGENT)
            .build()
            .map_err(WarmError::HttpClient)?;

        Ok(Self {
            client,
            concurrency: concurrency.max(1),
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    // Crawls every URL and returns all outcomes in arrival order
    pub async fn crawl(&self, urls: Vec<String>, rule: &RewriteRule) -> Result<Vec<CrawlOutcome>> {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        self.crawl_into(urls, rule, sender).await?;

        // Every sender is gone once crawl_into returns, so this loop ends
        let mut outcomes = Vec::new();
        while let Some(outcome) = receiver.recv().await {
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    // Crawls every URL, sending each outcome into `outcomes` as it completes
    //
    // Returns once every worker has finished, i.e. after exactly one
    // outcome per URL has been sent. Returns how many URLs were crawled.
    pub async fn crawl_into(
        &self,
        urls: Vec<String>,
        rule: &RewriteRule,
        outcomes: UnboundedSender<CrawlOutcome>,
    ) -> Result<usize> {
        let total = urls.len();
        let queue: UrlQueue = Arc::new(Mutex::new(urls.into()));
        let rule = Arc::new(rule.clone());

        debug!(total, workers = self.concurrency, "starting crawl workers");

        let workers: Vec<_> = (0..self.concurrency)
            .map(|worker_id| {
                let client = self.client.clone();
                let queue = Arc::clone(&queue);
                let rule = Arc::clone(&rule);
                let outcomes = outcomes.clone();
                tokio::spawn(run_worker(worker_id, client, queue, rule, outcomes))
            })
            .collect();

        // Only the workers hold senders now; the channel closes when they finish
        drop(outcomes);

        let mut crawled = 0;
        for result in join_all(workers).await {
            crawled += result.context("crawl worker panicked")?;
        }

        debug!(crawled, "all crawl workers finished");
        Ok(crawled)
    }
}

// One worker: take a URL, crawl it, report it, repeat until the queue is empty
async fn run_worker(
    worker_id: usize,
    client: Client,
    queue: UrlQueue,
    rule: Arc<RewriteRule>,
    outcomes: UnboundedSender<CrawlOutcome>,
) -> usize {
    let mut crawled = 0;

    while let Some(url) = next_url(&queue) {
        let url = rule.rewrite(&url);
        let outcome = crawl_url(&client, url).await;
        debug!(worker_id, url = %outcome.url, status = %outcome.status, "crawled");

        if outcomes.send(outcome).is_err() {
            warn!(worker_id, "outcome collector has stopped, result dropped");
        }
        crawled += 1;
    }

    crawled
}

// The lock is released before the caller awaits anything
fn next_url(queue: &Mutex<VecDeque<String>>) -> Option<String> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

// Fetches one URL and turns whatever happens into a CrawlOutcome
async fn crawl_url(client: &Client, url: String) -> CrawlOutcome {
    match client.get(&url).send().await {
        Ok(response) => {
            let status = response.status();
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => format!("Failed to read response body: {}", e),
            };
            CrawlOutcome::from_response(url, status, body)
        }
        Err(e) => {
            let message = describe_error(&e);
            CrawlOutcome::transport_error(url, message)
        }
    }
}

// Turns a reqwest error into a readable one-line description
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
// - A URL that isn't a URL (e.g. after a bad domain rewrite)
fn describe_error(error: &reqwest::Error) -> String {
    let error_string = error.to_string();

    if error.is_timeout() {
        format!("Request timed out: {}", error_string)
    } else if error.is_redirect() {
        format!("Too many redirects: {}", error_string)
    } else if error.is_builder() {
        format!("Invalid URL: {}", error_string)
    } else if error.is_connect() {
        let detail = std::error::Error::source(error)
            .map(|source| source.to_string())
            .unwrap_or_default();
        if detail.contains("dns") {
            format!("Could not resolve hostname: {}", error_string)
        } else {
            format!("Connection failed: {}", error_string)
        }
    } else {
        error_string
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why spawn N tasks instead of buffer_unordered(N)?
//    - buffer_unordered polls every request from a single task, so only one
//      thread ever drives them
//    - Spawned tasks are spread over all runtime threads
//
// 2. Why a std Mutex in async code?
//    - The lock is only held for a pop_front(), never across an .await
//    - tokio's Mutex is only needed when a guard lives across an .await
//
// 3. Why an unbounded channel?
//    - The collector only appends to a Vec and writes a line per outcome,
//      it can't fall meaningfully behind the network
//    - crawl() collects after the workers finish, which a bounded channel
//      would deadlock on
// -----------------------------------------------------------------------------
