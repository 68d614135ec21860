use crate::config::Location;
use crate::error::{FileIssue, ReasonCode};
use crate::hasher::{self, ContentFingerprint};
use crate::progress::ProgressReporter;
use crate::scanner::{self, FileFilter};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// One fingerprinted file inside one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Relative to the location root, `/`-separated.
    pub relative_path: String,
    pub location: String,
    pub absolute_path: PathBuf,
    pub fingerprint: ContentFingerprint,
}

#[derive(Debug, Default)]
pub struct Inventory {
    /// Sorted by (location order, relative path).
    pub records: Vec<FileRecord>,
    /// Names of configured locations whose root does not exist.
    pub missing_locations: Vec<String>,
    pub issues: Vec<FileIssue>,
    pub scan_duration: Duration,
}

impl Inventory {
    pub fn is_location_missing(&self, name: &str) -> bool {
        self.missing_locations.iter().any(|m| m == name)
    }
}

/// Walk every location and fingerprint each file passing `filter`.
///
/// Missing roots are skipped. Files that cannot be hashed are recorded as
/// issues and left out; nothing here aborts the scan.
pub fn scan_locations(
    locations: &[Location],
    filter: &FileFilter,
    reporter: &dyn ProgressReporter,
) -> Inventory {
    let scan_start = Instant::now();
    reporter.on_scan_start(locations.len());

    let mut inventory = Inventory::default();
    let mut hashed = 0usize;

    for location in locations {
        if !location.path.is_dir() {
            info!(
                "Skipping location '{}': {} does not exist",
                location.name,
                location.path.display()
            );
            inventory.missing_locations.push(location.name.clone());
            continue;
        }

        let (files, walk_issues) = scanner::walk_files(&location.path, filter);
        debug!(
            "Location '{}': {} candidate files",
            location.name,
            files.len()
        );
        inventory.issues.extend(walk_issues);

        for file in files {
            match hasher::fingerprint_file(&file.absolute_path) {
                Ok(fingerprint) => {
                    hashed += 1;
                    reporter.on_file_hashed(hashed, &file.relative_path);
                    inventory.records.push(FileRecord {
                        relative_path: file.relative_path,
                        location: location.name.clone(),
                        absolute_path: file.absolute_path,
                        fingerprint,
                    });
                }
                Err(e) => {
                    warn!("Could not hash {}: {}", file.absolute_path.display(), e);
                    inventory.issues.push(FileIssue::new(
                        &file.absolute_path,
                        ReasonCode::Unreadable,
                        e,
                    ));
                }
            }
        }
    }

    inventory.scan_duration = scan_start.elapsed();
    reporter.on_scan_complete(
        inventory.records.len(),
        inventory.scan_duration.as_secs_f64(),
    );
    info!(
        "Scanned {} files across {} locations ({} missing, {} skipped files)",
        inventory.records.len(),
        locations.len() - inventory.missing_locations.len(),
        inventory.missing_locations.len(),
        inventory.issues.len(),
    );

    inventory
}
