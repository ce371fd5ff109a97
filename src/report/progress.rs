// src/report/progress.rs
// Completion percentage shown in verbose mode, redrawn in place on stdout.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub struct ProgressReporter {
    bar: ProgressBar,
    total: u64,
}

impl ProgressReporter {
    /// A hidden reporter still counts, it just never draws
    pub fn new(total: usize, visible: bool) -> Self {
        let total = total as u64;
        let target = if visible {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        };

        let bar = ProgressBar::with_draw_target(Some(total), target);
        bar.set_style(
            ProgressStyle::with_template("{percent}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        Self { bar, total }
    }

    pub fn advance(&self) {
        self.bar.inc(1);
    }

    /// Rounded percentage of outcomes received so far
    pub fn percent(&self) -> u64 {
        if self.total == 0 {
            return 100;
        }
        ((self.bar.position() as f64 / self.total as f64) * 100.0).round() as u64
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}
