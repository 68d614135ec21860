pub mod copy;
pub mod engine;

pub use copy::sync_file;
pub use engine::merge_directories;

use crate::error::FileIssue;
use crate::scanner::FileFilter;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// What a path present in both sources is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    /// The primary source file's mtime.
    #[default]
    Source,
    /// The mtime of the primary copy already written to the destination.
    Destination,
}

impl TimestampSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampSource::Source => "source",
            TimestampSource::Destination => "destination",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeAction {
    CopiedFromPrimary,
    UpdatedFromSecondaryNewer,
    KeptFromPrimaryNewer,
    AddedFromSecondary,
}

impl MergeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeAction::CopiedFromPrimary => "copied-from-primary",
            MergeAction::UpdatedFromSecondaryNewer => "updated-from-secondary-newer",
            MergeAction::KeptFromPrimaryNewer => "kept-from-primary-newer",
            MergeAction::AddedFromSecondary => "added-from-secondary-new",
        }
    }
}

impl fmt::Display for MergeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decision taken for one relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeEntry {
    pub relative_path: String,
    pub action: MergeAction,
    pub primary_mtime: Option<SystemTime>,
    pub secondary_mtime: Option<SystemTime>,
    /// False when the destination already matched and nothing was rewritten.
    pub written: bool,
}

#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub primary: PathBuf,
    pub secondary: PathBuf,
    pub destination: PathBuf,
    pub filter: FileFilter,
    pub timestamp_source: TimestampSource,
}

impl MergeRequest {
    pub fn new(
        primary: impl Into<PathBuf>,
        secondary: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            destination: destination.into(),
            filter: FileFilter::all(),
            timestamp_source: TimestampSource::default(),
        }
    }

    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_timestamp_source(mut self, source: TimestampSource) -> Self {
        self.timestamp_source = source;
        self
    }
}

#[derive(Debug, Default)]
pub struct MergeReport {
    /// One entry per relative path, sorted by path.
    pub entries: Vec<MergeEntry>,
    pub issues: Vec<FileIssue>,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub copied: usize,
    pub updated: usize,
    pub kept: usize,
    pub added: usize,
    pub written: usize,
    pub failed: usize,
}

impl MergeSummary {
    pub fn total(&self) -> usize {
        self.copied + self.updated + self.kept + self.added
    }
}

impl MergeReport {
    pub fn summary(&self) -> MergeSummary {
        let mut summary = MergeSummary {
            failed: self.issues.len(),
            ..MergeSummary::default()
        };
        for entry in &self.entries {
            match entry.action {
                MergeAction::CopiedFromPrimary => summary.copied += 1,
                MergeAction::UpdatedFromSecondaryNewer => summary.updated += 1,
                MergeAction::KeptFromPrimaryNewer => summary.kept += 1,
                MergeAction::AddedFromSecondary => summary.added += 1,
            }
            if entry.written {
                summary.written += 1;
            }
        }
        summary
    }

    pub fn entry(&self, relative_path: &str) -> Option<&MergeEntry> {
        self.entries
            .iter()
            .find(|e| e.relative_path == relative_path)
    }
}
