use indicatif::{ProgressBar, ProgressStyle};
use salvage_core::merge::MergeEntry;
use salvage_core::{FileIssue, ProgressReporter};
use std::cell::RefCell;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif.
///
/// - Scan phase: spinner with a running file count
/// - Merge phase: bar over the number of relative paths
pub struct CliReporter {
    bar: RefCell<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: RefCell::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Some(old) = self.bar.replace(Some(pb)) {
            old.finish_and_clear();
        }
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_and_clear();
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            f(pb);
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(TICK_CHARS),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self, locations: usize) {
        self.set_bar(spinner(&format!("Scanning {} locations...", locations)));
    }

    fn on_file_hashed(&self, files_hashed: usize, _current_path: &str) {
        self.with_bar(|pb| pb.set_message(format!("Hashing... {} files", files_hashed)));
    }

    fn on_scan_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} files in {:.2}s",
            total_files, duration_secs
        );
    }

    fn on_merge_start(&self, total_paths: usize) {
        let pb = ProgressBar::new(total_paths as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Merging [{bar:30.cyan/dim}] {pos}/{len} files",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─")
            .tick_chars(TICK_CHARS),
        );
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_merge_entry(&self, _entry: &MergeEntry) {
        self.with_bar(|pb| pb.inc(1));
    }

    fn on_merge_issue(&self, _issue: &FileIssue) {
        self.with_bar(|pb| pb.inc(1));
    }

    fn on_merge_complete(&self, entries: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Merge complete: {} files in {:.2}s",
            entries, duration_secs
        );
    }
}
