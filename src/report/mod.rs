// src/report/mod.rs
// =============================================================================
// This module gathers crawl outcomes and reports on them.
//
// Submodules:
// - aggregate: Output files, summary, exit code and the final printout
// - progress: Verbose-mode completion percentage
// =============================================================================

mod aggregate;
mod progress;

pub use aggregate::{
    print_rule, summarize, write_json_report, write_report, OutputFiles, ResultAggregator,
    DEFAULT_FAILURE_FILE, OK_REPORT_FILE,
};
pub use progress::ProgressReporter;
