// src/logging.rs
// =============================================================================
// Sets up `tracing` so log events end up on stderr.
//
// stdout is reserved for the report (and the progress percentage), so logs
// never get mixed into output someone might pipe into another program.
//
// Filtering:
// - RUST_LOG wins when set (e.g. RUST_LOG=sitemap_warmer=debug)
// - Otherwise: "info" with --verbose, "warn" without
// =============================================================================

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("could not initialise logging: {}", e))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "info"
    } else {
        "warn"
    }
}
