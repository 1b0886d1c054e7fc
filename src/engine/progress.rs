//! Progress bar for the download pass.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Counts finished downloads (written, skipped or failed) out of the queued total.
///
/// Hidden when progress output was not requested, so callers can drive it
/// unconditionally.
#[derive(Debug)]
pub(crate) struct DownloadProgress {
    bar: ProgressBar,
}

impl DownloadProgress {
    pub(crate) fn new(enabled: bool, total: usize) -> Self {
        if !enabled || total == 0 {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// Shows the asset currently being processed.
    pub(crate) fn start(&self, site: &str, asset: &str) {
        self.bar.set_message(format!("{site}.{asset}"));
    }

    pub(crate) fn advance(&self) {
        self.bar.inc(1);
    }

    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.bar.position()
    }

    #[cfg(test)]
    fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }
}
