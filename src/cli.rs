// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap handles the simple rules for us:
// - Exactly one of --file / --url (an ArgGroup)
// - --old-domain and --new-domain only together (`requires`)
// - --threads must be at least 1 (a ranged value parser)
//
// The rules clap can't express (does the file exist? is the URL http?)
// live in Cli::into_config, which turns raw arguments into a WarmConfig.
// Every option can also come from a WARMER_* environment variable.
//
// Rust concepts:
// - Derive macros: Generate the parser from the struct definition
// - Consuming conversion: into_config(self) moves the arguments into
//   the validated config instead of copying them
// =============================================================================

use crate::crawl::{RewriteRule, DEFAULT_CONCURRENCY};
use crate::error::WarmError;
use crate::report::{DEFAULT_FAILURE_FILE, OK_REPORT_FILE};
use crate::sitemap::{is_http, SitemapSource};
use clap::builder::RangedU64ValueParser;
use clap::{ArgGroup, Parser};
use std::path::{Component, Path, PathBuf};
use url::Url;

#[derive(Parser, Debug)]
#[command(
    name = "sitemap-warmer",
    version,
    about = "Warm a website's cache by crawling every URL in its sitemap",
    long_about = "sitemap-warmer requests every page listed in a sitemap.xml (following sitemap \
                  indexes) with a pool of parallel workers, so caches and CDNs are populated \
                  before real visitors arrive. Pages answering 404 are written to the output file."
)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "url"])))]
pub struct Cli {
    /// The sitemap xml file
    #[arg(short, long, env = "WARMER_FILE")]
    pub file: Option<PathBuf>,

    /// The sitemap xml url
    #[arg(short, long, env = "WARMER_URL")]
    pub url: Option<String>,

    /// The old domain to replace in every sitemap URL
    #[arg(short = 'd', long, env = "WARMER_OLD_DOMAIN", requires = "new_domain")]
    pub old_domain: Option<String>,

    /// The new domain to replace it with
    #[arg(short = 'n', long, env = "WARMER_NEW_DOMAIN", requires = "old_domain")]
    pub new_domain: Option<String>,

    /// How many parallel workers to use
    #[arg(
        short,
        long,
        env = "WARMER_THREADS",
        default_value_t = DEFAULT_CONCURRENCY,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub threads: usize,

    /// The file that receives every URL that failed
    #[arg(short, long, env = "WARMER_OUTPUT", default_value = DEFAULT_FAILURE_FILE)]
    pub output: PathBuf,

    /// Show progress while crawling
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the final report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

// Everything a warming run needs, already validated
#[derive(Debug, Clone)]
pub struct WarmConfig {
    pub source: SitemapSource,
    pub concurrency: usize,
    pub rewrite: RewriteRule,
    pub output: PathBuf,
    pub verbose: bool,
    pub json: bool,
}

impl Cli {
    pub fn into_config(self) -> Result<WarmConfig, WarmError> {
        let source = match (self.file, self.url) {
            (Some(file), None) => {
                if !file.is_file() {
                    return Err(WarmError::Config(format!(
                        "Could not find sitemap file {}",
                        file.display()
                    )));
                }
                SitemapSource::LocalFile(file)
            }
            (None, Some(url)) => SitemapSource::RemoteUrl(parse_sitemap_url(&url)?),
            _ => {
                return Err(WarmError::Config(
                    "exactly one of --file or --url is required".to_string(),
                ))
            }
        };

        if matches!(self.old_domain.as_deref(), Some("")) {
            return Err(WarmError::Config("--old-domain must not be empty".to_string()));
        }

        check_output_path(&self.output, &source)?;

        Ok(WarmConfig {
            source,
            concurrency: self.threads,
            rewrite: RewriteRule::new(self.old_domain, self.new_domain),
            output: self.output,
            verbose: self.verbose,
            json: self.json,
        })
    }
}

fn parse_sitemap_url(raw: &str) -> Result<Url, WarmError> {
    let url = Url::parse(raw)
        .map_err(|e| WarmError::Config(format!("Invalid sitemap URL '{}': {}", raw, e)))?;

    if !is_http(&url) {
        return Err(WarmError::Config(format!(
            "Sitemap URL must use http or https: {}",
            raw
        )));
    }

    Ok(url)
}

// The failure file must not clobber the fixed ok file or the sitemap itself
fn check_output_path(output: &Path, source: &SitemapSource) -> Result<(), WarmError> {
    if same_path(output, Path::new(OK_REPORT_FILE)) {
        return Err(WarmError::Config(format!(
            "--output cannot be {}, that file is always written with the successful URLs",
            OK_REPORT_FILE
        )));
    }

    if let SitemapSource::LocalFile(sitemap) = source {
        if same_path(output, sitemap) {
            return Err(WarmError::Config(format!(
                "--output would overwrite the sitemap file {}",
                sitemap.display()
            )));
        }
    }

    Ok(())
}

// Compares resolved locations, so "/abs/dir/x", "sub/../x" and "./x" all
// match "x" when they name the same file
fn same_path(a: &Path, b: &Path) -> bool {
    match (resolve_path(a), resolve_path(b)) {
        (Some(a), Some(b)) => a == b,
        _ => strip_cur_dir(a) == strip_cur_dir(b),
    }
}

// The file may not exist yet, so fall back to resolving its directory
fn resolve_path(path: &Path) -> Option<PathBuf> {
    if let Ok(resolved) = path.canonicalize() {
        return Some(resolved);
    }

    let file_name = path.file_name()?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    dir.canonicalize().ok().map(|dir| dir.join(file_name))
}

fn strip_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why are some checks here and not in clap?
//    - clap validates each argument on its own
//    - "the output file is the sitemap file" needs two arguments and the
//      file system, so we check it after parsing
//
// 2. What happens on a bad combination?
//    - main.rs reports it as a clap usage error (exit code 2) before any
//      file is created or any request is sent
// -----------------------------------------------------------------------------
