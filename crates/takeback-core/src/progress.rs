//! Progress display for TTY and non-TTY environments
//!
//! TTY mode: an indicatif bar per batch, cleared on completion.
//! Non-TTY mode: hidden bars; the log lines are the progress output.

use std::io::IsTerminal;
use std::sync::Arc;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Central progress context; detects TTY once at startup.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: std::io::stderr().is_terminal(),
        }
    }

    /// Item-count bar for a fetch batch. Hidden off-TTY.
    pub fn batch_bar(&self, label: &str, total: usize) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(total as u64));
        pb.set_style(
            ProgressStyle::with_template(
                "{prefix:<18.cyan} {bar:28.green/dim} {pos:>4}/{len:4} {wide_msg:.dim}",
            )
            .expect("invalid template")
            .progress_chars("=>-"),
        );
        pb.set_prefix(label.to_string());
        pb
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe handle passed down into the pipelines.
pub type SharedProgress = Arc<ProgressContext>;
