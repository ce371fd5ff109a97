// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse and validate command-line arguments
// 2. Resolve the sitemap into a list of page URLs
// 3. Crawl every URL with a fixed pool of workers while the collector
//    writes the output files
// 4. Print the report and exit (0 = all warmed, 1 = errors, 2 = fatal)
//
// Rust concepts used:
// - async/await: Many network requests in flight at once
// - tokio::try_join!: Run the workers and the collector side by side
// - Result<T, E>: Fatal errors bubble up to main with the ? operator
// =============================================================================

mod cli;
mod crawl;
mod error;
mod logging;
mod report;
mod sitemap;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use cli::{Cli, WarmConfig};
use crawl::CrawlWorkerPool;
use report::{OutputFiles, ProgressReporter, ResultAggregator, OK_REPORT_FILE};
use sitemap::SitemapResolver;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() {
    // Bad input is a usage error: clap prints it and exits with code 2
    // before anything touches the network or the file system
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    if let Err(e) = logging::init_logging(config.verbose) {
        eprintln!("Warning: {}", e);
    }

    let exit_code = match run(config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every URL warmed
//   Ok(1) = at least one URL returned 404 or could not be reached
//   Err   = fatal error (sitemap unreadable, output file not writable, ...)
async fn run(config: WarmConfig) -> Result<i32> {
    warm(&config, Path::new(OK_REPORT_FILE), &mut std::io::stdout()).await
}

// One full warming run: resolve, crawl while collecting, then report to `out`
async fn warm<W: Write>(config: &WarmConfig, ok_path: &Path, out: &mut W) -> Result<i32> {
    let started = Instant::now();

    let resolver = SitemapResolver::new()?;
    let urls = resolver.resolve(&config.source).await?;

    if config.rewrite.is_active() {
        info!(rule = ?config.rewrite, "rewriting URLs before crawling");
    }

    let show_progress = config.verbose && !config.json;
    if show_progress {
        writeln!(
            out,
            "Crawling {} urls with {} threads\n[Please Wait!]",
            urls.len(),
            config.concurrency
        )?;
        report::print_rule(out)?;
        out.flush()?;
    }

    let pool = CrawlWorkerPool::new(config.concurrency)?;
    let files = OutputFiles::create(&config.output, ok_path).await?;
    let aggregator = ResultAggregator::new(files, ProgressReporter::new(urls.len(), show_progress));

    let (sender, receiver) = mpsc::unbounded_channel();
    let (crawled, outcomes) = tokio::try_join!(
        pool.crawl_into(urls, &config.rewrite, sender),
        aggregator.collect(receiver),
    )?;
    info!(crawled, workers = pool.concurrency(), "crawl finished");

    let (summary, exit_code) = report::summarize(&outcomes, started.elapsed());

    if config.json {
        report::write_json_report(out, &outcomes, &summary)?;
    } else {
        report::write_report(out, &outcomes, &summary)?;
    }

    Ok(exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crawl::RewriteRule;
    use sitemap::SitemapSource;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn page(server: &MockServer, route: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(format!("page {}", route)))
            .expect(1)
            .mount(server)
            .await;
    }

    fn config(sitemap_url: &str, output: &Path) -> WarmConfig {
        WarmConfig {
            source: SitemapSource::RemoteUrl(url::Url::parse(sitemap_url).unwrap()),
            concurrency: 3,
            rewrite: RewriteRule::default(),
            output: output.to_path_buf(),
            verbose: false,
            json: false,
        }
    }

    fn sorted_lines(path: &Path) -> Vec<String> {
        let mut lines: Vec<String> = std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        lines.sort();
        lines
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_warms_sitemap_end_to_end() {
        let server = MockServer::start().await;
        let base = server.uri();
        let sitemap = format!(
            "<urlset>\n<url><loc>{base}/a</loc></url>\n<url><loc>{base}/b</loc></url>\n<url><loc>{base}/c</loc></url>\n</urlset>",
            base = base
        );
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sitemap))
            .mount(&server)
            .await;
        page(&server, "/a", 200).await;
        page(&server, "/b", 404).await;
        page(&server, "/c", 200).await;

        let dir = tempfile::tempdir().unwrap();
        let failures = dir.path().join("404.txt");
        let ok = dir.path().join(OK_REPORT_FILE);
        let config = config(&format!("{}/sitemap.xml", base), &failures);

        let mut out = Vec::new();
        let exit_code = warm(&config, &ok, &mut out).await.unwrap();

        assert_eq!(exit_code, 1);
        assert_eq!(
            sorted_lines(&ok),
            vec![format!("200: {}/a", base), format!("200: {}/c", base)]
        );
        assert_eq!(sorted_lines(&failures), vec![format!("404: {}/b", base)]);

        let report = String::from_utf8(out).unwrap();
        assert!(report.contains(&format!("Errors detected in {}/b:\npage /b\n", base)));
        assert!(report.contains("1 Errors detected! - done in "));
        server.verify().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unreachable_sitemap_creates_no_files() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let failures = dir.path().join("404.txt");
        let ok = dir.path().join(OK_REPORT_FILE);
        let config = config(&format!("{}/sitemap.xml", server.uri()), &failures);

        let mut out = Vec::new();
        assert!(warm(&config, &ok, &mut out).await.is_err());
        assert!(!failures.exists());
        assert!(!ok.exists());
        assert!(out.is_empty());
    }
}
