//! Terminal progress bar for an analysis run.

use crate::analysis::ProgressSink;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Shown in place of the status line when a run fails.
pub const FAILURE_MESSAGE: &str = "Analysis failed, please try again";

/// Single progress bar: position is the percent, message is the status line.
pub struct ProgressUi {
    bar: ProgressBar,
}

impl ProgressUi {
    pub fn new(hidden: bool) -> Self {
        let bar = ProgressBar::new(100);
        if hidden {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .expect("progress bar template is a valid static string")
                .progress_chars("#>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Reset, show the failure line, then clear it after `dismiss_after`.
    pub async fn fail(&self, dismiss_after: Duration) {
        self.bar.set_position(0);
        self.bar.abandon_with_message(FAILURE_MESSAGE);
        tokio::time::sleep(dismiss_after).await;
        self.bar.finish_and_clear();
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.bar.position()
    }

    #[cfg(test)]
    fn message(&self) -> String {
        self.bar.message()
    }
}

impl ProgressSink for ProgressUi {
    fn report(&mut self, percent: u8, status: &str) {
        self.bar.set_position(u64::from(percent.min(100)));
        self.bar.set_message(status.to_string());
    }
}
