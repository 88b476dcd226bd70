//! Progress display for a single generation run

use crate::algorithm::executor::TickEvent;
use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::LazyLock;

static PROGRESS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} cells {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Collapsed-cell counter for one run
pub struct RunProgress {
    bar: ProgressBar,
}

impl RunProgress {
    /// Bar sized to `cell_count`, labelled with `name`
    pub fn new(name: &str, cell_count: usize) -> Self {
        let bar = ProgressBar::new(cell_count as u64);
        bar.set_style(PROGRESS_STYLE.clone());
        bar.set_prefix(name.to_string());
        Self { bar }
    }

    /// A bar that never draws, for quiet runs
    pub fn hidden(cell_count: usize) -> Self {
        let bar = ProgressBar::with_draw_target(Some(cell_count as u64), ProgressDrawTarget::hidden());
        Self { bar }
    }

    /// Reflect the collapsed count after a tick
    pub fn record(&self, event: &TickEvent) {
        self.bar.set_position(event.collapsed_count as u64);
        if !event.propagation.forced.is_empty() {
            self.bar
                .set_message(format!("(+{} forced)", event.propagation.forced.len()));
        }
    }

    /// Cells shown as collapsed so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Close the bar with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}
