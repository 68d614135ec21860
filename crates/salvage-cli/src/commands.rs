use clap::{Parser, Subcommand, ValueEnum};
use salvage_core::TimestampSource;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "salvage")]
#[command(about = "Reconcile scattered copies of a source tree", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./Config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fingerprint configured locations and write duplicate and conflict reports
    Scan {
        /// File extension to inventory, overriding the configuration
        #[arg(long)]
        extension: Option<String>,
        /// Directory the CSV reports are written to
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Show which locations hold each file and write the comparison list
    List,
    /// Merge two directories, newer secondary files winning
    Merge {
        primary: PathBuf,
        secondary: PathBuf,
        destination: PathBuf,
        /// What a secondary file's timestamp is compared against
        #[arg(long, value_enum)]
        compare_with: Option<CompareWith>,
        /// Only merge files with this extension (all files when omitted)
        #[arg(long)]
        extension: Option<String>,
        /// Write the audit trail to this CSV file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Recover files from editor snapshot caches
    #[command(subcommand)]
    Recover(RecoverCommand),
    /// Numbered menu for browsing, diffing and copying files
    Interactive,
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Subcommand)]
pub enum RecoverCommand {
    /// Recover a single snapshot into OUTPUT
    File { snapshot: PathBuf, output: PathBuf },
    /// Recover every snapshot in SOURCE into categorized folders under DESTINATION
    Folder {
        source: PathBuf,
        destination: PathBuf,
        #[arg(long)]
        extension: Option<String>,
    },
    /// Recover the newest snapshot of each named file from the configured caches
    Latest {
        destination: PathBuf,
        /// File names to look for (defaults to the configured critical files)
        names: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompareWith {
    /// The primary source file
    Source,
    /// The primary copy already written to the destination
    Destination,
}

impl From<CompareWith> for TimestampSource {
    fn from(value: CompareWith) -> Self {
        match value {
            CompareWith::Source => TimestampSource::Source,
            CompareWith::Destination => TimestampSource::Destination,
        }
    }
}
