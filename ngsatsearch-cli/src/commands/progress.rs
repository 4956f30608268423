//! Download progress bars on stderr.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use ngsatsearch::ProgressCallback;

/// One bar per scene, stacked while downloads run in parallel.
pub struct DownloadBars {
    multi: MultiProgress,
    enabled: bool,
}

impl DownloadBars {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            enabled,
        }
    }

    /// Add a bar for one scene; hidden when progress is disabled.
    pub fn add(&self, identifier: &str) -> ProgressBar {
        let bar = if self.enabled {
            self.multi.add(ProgressBar::new(0))
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(download_style());
        bar.set_prefix(identifier.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    pub fn clear(&self) {
        self.multi.clear().ok();
    }
}

fn download_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.cyan} {prefix}  {wide_bar:.cyan/dim}  {bytes}/{total_bytes}  {bytes_per_sec}  {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━━─")
}

/// Feed download progress of every file of a scene into `bar`.
pub fn bar_callback(bar: ProgressBar) -> ProgressCallback {
    Arc::new(move |file: &str, bytes: u64, total: Option<u64>| {
        if bar.message() != file {
            bar.set_message(file.to_string());
        }
        if let Some(total) = total {
            bar.set_length(total);
        }
        bar.set_position(bytes);
    })
}
