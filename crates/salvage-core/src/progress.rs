use crate::error::FileIssue;
use crate::merge::MergeEntry;

/// Trait for reporting batch progress.
///
/// The CLI implements it with indicatif; tests use `SilentReporter`.
/// All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_scan_start(&self, _locations: usize) {}
    fn on_file_hashed(&self, _files_hashed: usize, _current_path: &str) {}
    fn on_scan_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_merge_start(&self, _total_paths: usize) {}
    fn on_merge_entry(&self, _entry: &MergeEntry) {}
    /// A path that could not be merged; called instead of `on_merge_entry`.
    fn on_merge_issue(&self, _issue: &FileIssue) {}
    fn on_merge_complete(&self, _entries: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
