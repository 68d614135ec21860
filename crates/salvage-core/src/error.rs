use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown location '{0}'")]
    UnknownLocation(String),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("{0}")]
    File(FileIssue),

    #[error("{0}")]
    Other(String),
}

/// Why a single file was left out of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    /// Could not be opened or read while fingerprinting.
    Unreadable,
    /// Metadata (size, mtime) could not be read.
    MetadataUnavailable,
    /// Present at inventory time, gone before the copy.
    Vanished,
    CopyFailed,
    WriteFailed,
    SnapshotNotFound,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::Unreadable => "unreadable",
            ReasonCode::MetadataUnavailable => "metadata-unavailable",
            ReasonCode::Vanished => "vanished",
            ReasonCode::CopyFailed => "copy-failed",
            ReasonCode::WriteFailed => "write-failed",
            ReasonCode::SnapshotNotFound => "snapshot-not-found",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-file failure. Batches collect these instead of aborting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIssue {
    pub path: PathBuf,
    pub reason: ReasonCode,
    pub detail: String,
}

impl FileIssue {
    pub fn new(path: impl AsRef<Path>, reason: ReasonCode, detail: impl fmt::Display) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reason,
            detail: detail.to_string(),
        }
    }
}

impl fmt::Display for FileIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.reason, self.path.display(), self.detail)
    }
}
