pub mod analysis;
pub mod config;
pub mod error;
pub mod hasher;
pub mod inventory;
pub mod merge;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod snapshot;
pub mod transfer;

pub use config::{AppConfig, Location};
pub use error::{Error, FileIssue, ReasonCode};
pub use inventory::{scan_locations, FileRecord, Inventory};
pub use merge::{merge_directories, MergeAction, MergeReport, MergeRequest, TimestampSource};
pub use progress::{ProgressReporter, SilentReporter};
pub use scanner::FileFilter;
