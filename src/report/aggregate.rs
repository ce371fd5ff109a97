// src/report/aggregate.rs
// =============================================================================
// This module collects crawl outcomes and turns them into the final report.
//
// Two output files are written while the crawl runs:
// - The failure file (default 404.txt): "404: <url>" per not-found page,
//   "ERR: <url>" per page that never answered
// - 200-302.txt: "<status>: <url>" per page that answered with anything else
//
// Only the collector writes to these files. Workers hand their outcomes
// over a channel, so lines can never interleave.
//
// At the end we print every failure with its response body, then a one-line
// summary. The exit code is 0 when nothing failed, 1 otherwise.
//
// Rust concepts:
// - BufWriter: Batches many small writes into few system calls
// - Generic writers (W: Write): Lets tests capture the report in a Vec<u8>
// =============================================================================

use super::progress::ProgressReporter;
use crate::crawl::CrawlOutcome;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

/// Fixed name of the file listing every URL that answered
pub const OK_REPORT_FILE: &str = "200-302.txt";

/// Default name of the file listing every URL that failed
pub const DEFAULT_FAILURE_FILE: &str = "404.txt";

const RULE_WIDTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlSummary {
    pub total_count: usize,
    pub error_count: usize,
    pub elapsed_seconds: f64,
}

impl CrawlSummary {
    pub fn exit_code(&self) -> i32 {
        if self.error_count == 0 {
            0
        } else {
            1
        }
    }
}

// The two classification files, truncated when created
pub struct OutputFiles {
    failures: BufWriter<File>,
    ok: BufWriter<File>,
}

impl OutputFiles {
    pub async fn create(failure_path: &Path, ok_path: &Path) -> Result<Self> {
        let failures = File::create(failure_path)
            .await
            .with_context(|| format!("could not create {}", failure_path.display()))?;
        let ok = File::create(ok_path)
            .await
            .with_context(|| format!("could not create {}", ok_path.display()))?;

        Ok(Self {
            failures: BufWriter::new(failures),
            ok: BufWriter::new(ok),
        })
    }

    // Appends one line to the file matching the outcome
    pub async fn record(&mut self, outcome: &CrawlOutcome) -> std::io::Result<()> {
        let line = format!("{}: {}\n", outcome.status, outcome.url);
        if outcome.is_ok() {
            self.ok.write_all(line.as_bytes()).await
        } else {
            self.failures.write_all(line.as_bytes()).await
        }
    }

    pub async fn finish(mut self) -> std::io::Result<()> {
        self.failures.flush().await?;
        self.ok.flush().await
    }
}

pub struct ResultAggregator {
    files: OutputFiles,
    progress: ProgressReporter,
    outcomes: Vec<CrawlOutcome>,
}

impl ResultAggregator {
    pub fn new(files: OutputFiles, progress: ProgressReporter) -> Self {
        Self {
            files,
            progress,
            outcomes: Vec::new(),
        }
    }

    // Receives outcomes until every sender is dropped, i.e. until every
    // worker has finished. Returns all outcomes in arrival order.
    //
    // Only failure bodies end up in the report, so bodies of warmed pages
    // are dropped as soon as their line is written.
    pub async fn collect(mut self, mut receiver: UnboundedReceiver<CrawlOutcome>) -> Result<Vec<CrawlOutcome>> {
        while let Some(mut outcome) = receiver.recv().await {
            self.files
                .record(&outcome)
                .await
                .context("could not write crawl result")?;
            self.progress.advance();
            if outcome.is_ok() {
                outcome.body = String::new();
            }
            self.outcomes.push(outcome);
        }

        self.progress.finish();
        self.files.finish().await.context("could not flush output files")?;

        debug!(
            count = self.outcomes.len(),
            percent = self.progress.percent(),
            "collected all outcomes"
        );
        Ok(self.outcomes)
    }
}

// Counts failures and picks the exit code
pub fn summarize(outcomes: &[CrawlOutcome], elapsed: Duration) -> (CrawlSummary, i32) {
    let summary = CrawlSummary {
        total_count: outcomes.len(),
        error_count: outcomes.iter().filter(|o| !o.is_ok()).count(),
        elapsed_seconds: elapsed.as_secs_f64(),
    };
    let exit_code = summary.exit_code();
    (summary, exit_code)
}

// Prints each failure with its body, then the final summary line
pub fn write_report<W: Write>(out: &mut W, outcomes: &[CrawlOutcome], summary: &CrawlSummary) -> std::io::Result<()> {
    for outcome in outcomes.iter().filter(|o| !o.is_ok()) {
        writeln!(out, "Errors detected in {}:\n{}\n", outcome.url, outcome.body)?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    }

    if summary.error_count == 0 {
        writeln!(
            out,
            "All DONE! - All urls are warmed! - done in {:.4}s",
            summary.elapsed_seconds
        )
    } else {
        writeln!(
            out,
            "{} Errors detected! - done in {:.4}s",
            summary.error_count, summary.elapsed_seconds
        )
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a CrawlSummary,
    failures: Vec<&'a CrawlOutcome>,
}

// Same information as write_report, as one JSON document
pub fn write_json_report<W: Write>(out: &mut W, outcomes: &[CrawlOutcome], summary: &CrawlSummary) -> Result<()> {
    let report = JsonReport {
        summary,
        failures: outcomes.iter().filter(|o| !o.is_ok()).collect(),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn print_rule<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use tokio::sync::mpsc;

    fn outcome(url: &str, status: StatusCode) -> CrawlOutcome {
        CrawlOutcome::from_response(url.to_string(), status, format!("body of {}", url))
    }

    async fn collect_into(dir: &Path, outcomes: Vec<CrawlOutcome>) -> Vec<CrawlOutcome> {
        let files = OutputFiles::create(&dir.join("404.txt"), &dir.join(OK_REPORT_FILE))
            .await
            .unwrap();
        let aggregator = ResultAggregator::new(files, ProgressReporter::new(outcomes.len(), false));

        let (sender, receiver) = mpsc::unbounded_channel();
        for o in outcomes {
            sender.send(o).unwrap();
        }
        drop(sender);

        aggregator.collect(receiver).await.unwrap()
    }

    fn lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_partitions_into_output_files() {
        let dir = tempfile::tempdir().unwrap();
        let collected = collect_into(
            dir.path(),
            vec![
                outcome("https://example.com/a", StatusCode::OK),
                outcome("https://example.com/b", StatusCode::NOT_FOUND),
                outcome("https://example.com/c", StatusCode::OK),
            ],
        )
        .await;

        assert_eq!(collected.len(), 3);
        assert_eq!(
            lines(&dir.path().join(OK_REPORT_FILE)),
            vec!["200: https://example.com/a", "200: https://example.com/c"]
        );
        assert_eq!(
            lines(&dir.path().join("404.txt")),
            vec!["404: https://example.com/b"]
        );

        let (summary, exit_code) = summarize(&collected, Duration::from_millis(10));
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.error_count, 1);
        assert_eq!(exit_code, 1);
    }

    #[tokio::test]
    async fn test_server_errors_and_transport_errors() {
        let dir = tempfile::tempdir().unwrap();
        collect_into(
            dir.path(),
            vec![
                outcome("https://example.com/boom", StatusCode::INTERNAL_SERVER_ERROR),
                CrawlOutcome::transport_error(
                    "https://down.example.com/".to_string(),
                    "Connection failed".to_string(),
                ),
            ],
        )
        .await;

        assert_eq!(
            lines(&dir.path().join(OK_REPORT_FILE)),
            vec!["500: https://example.com/boom"]
        );
        assert_eq!(
            lines(&dir.path().join("404.txt")),
            vec!["ERR: https://down.example.com/"]
        );
    }

    #[tokio::test]
    async fn test_keeps_only_failure_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let collected = collect_into(
            dir.path(),
            vec![
                outcome("https://example.com/a", StatusCode::OK),
                outcome("https://example.com/b", StatusCode::NOT_FOUND),
                outcome("https://example.com/c", StatusCode::INTERNAL_SERVER_ERROR),
            ],
        )
        .await;

        let body = |url: &str| {
            collected
                .iter()
                .find(|o| o.url == url)
                .unwrap()
                .body
                .clone()
        };
        assert_eq!(body("https://example.com/a"), "");
        assert_eq!(body("https://example.com/c"), "");
        assert_eq!(body("https://example.com/b"), "body of https://example.com/b");
    }

    #[tokio::test]
    async fn test_output_files_are_truncated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("404.txt"), "404: https://stale.example.com/\n").unwrap();
        std::fs::write(dir.path().join(OK_REPORT_FILE), "200: https://stale.example.com/\n").unwrap();

        collect_into(dir.path(), vec![outcome("https://example.com/", StatusCode::OK)]).await;

        assert!(lines(&dir.path().join("404.txt")).is_empty());
        assert_eq!(
            lines(&dir.path().join(OK_REPORT_FILE)),
            vec!["200: https://example.com/"]
        );
    }

    #[test]
    fn test_all_clear_report() {
        let outcomes = vec![outcome("https://example.com/", StatusCode::OK)];
        let (summary, exit_code) = summarize(&outcomes, Duration::from_millis(1500));
        assert_eq!(exit_code, 0);

        let mut out = Vec::new();
        write_report(&mut out, &outcomes, &summary).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text, "All DONE! - All urls are warmed! - done in 1.5000s\n");
    }

    #[test]
    fn test_error_report_lists_each_failure() {
        let outcomes = vec![
            outcome("https://example.com/a", StatusCode::NOT_FOUND),
            outcome("https://example.com/b", StatusCode::OK),
            CrawlOutcome::transport_error("https://example.com/c".to_string(), "Request timed out".to_string()),
        ];
        let (summary, _) = summarize(&outcomes, Duration::from_secs(2));

        let mut out = Vec::new();
        write_report(&mut out, &outcomes, &summary).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Errors detected in https://example.com/a:\nbody of https://example.com/a\n"));
        assert!(text.contains("Errors detected in https://example.com/c:\nRequest timed out\n"));
        assert!(!text.contains("https://example.com/b"));
        assert_eq!(text.matches(&"=".repeat(RULE_WIDTH)).count(), 2);
        assert!(text.ends_with("2 Errors detected! - done in 2.0000s\n"));
    }

    #[test]
    fn test_json_report() {
        let outcomes = vec![
            outcome("https://example.com/a", StatusCode::NOT_FOUND),
            outcome("https://example.com/b", StatusCode::OK),
        ];
        let (summary, _) = summarize(&outcomes, Duration::from_secs(1));

        let mut out = Vec::new();
        write_json_report(&mut out, &outcomes, &summary).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["summary"]["total_count"], 2);
        assert_eq!(value["summary"]["error_count"], 1);
        assert_eq!(value["failures"].as_array().unwrap().len(), 1);
        assert_eq!(value["failures"][0]["url"], "https://example.com/a");
    }
}
