use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{GlobalFlags, OutputFormat};

/// Thin wrapper so handlers never branch on whether progress is visible.
pub struct Progress {
    bar: Option<ProgressBar>,
}

fn enabled(flags: &GlobalFlags) -> bool {
    std::io::stderr().is_terminal() && !flags.quiet && flags.format != OutputFormat::Json
}

impl Progress {
    #[must_use]
    pub fn spinner(flags: &GlobalFlags, message: &str) -> Self {
        if !enabled(flags) {
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        Self { bar: Some(bar) }
    }

    pub fn finish_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
