use super::copy::{modified_time, sync_file};
use super::{MergeAction, MergeEntry, MergeReport, MergeRequest, TimestampSource};
use crate::error::{Error, FileIssue};
use crate::progress::ProgressReporter;
use crate::scanner::{self, join_relative};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};
use tracing::{debug, info, warn};

#[derive(Default)]
struct Sources {
    primary: Option<PathBuf>,
    secondary: Option<PathBuf>,
}

/// Merge two source trees into `request.destination`.
///
/// Paths found in only one source are copied as-is. Paths in both are
/// resolved by mtime: the secondary copy wins only when it is strictly newer
/// than the comparison target chosen by `request.timestamp_source`.
/// Per-file failures land in `MergeReport::issues`; only a missing source
/// root is an error.
pub fn merge_directories(
    request: &MergeRequest,
    reporter: &dyn ProgressReporter,
) -> Result<MergeReport, Error> {
    for root in [&request.primary, &request.secondary] {
        if !root.is_dir() {
            return Err(Error::NotADirectory(root.clone()));
        }
    }

    let merge_start = Instant::now();
    let mut report = MergeReport::default();

    let (primary_files, primary_issues) = scanner::walk_files(&request.primary, &request.filter);
    let (secondary_files, secondary_issues) =
        scanner::walk_files(&request.secondary, &request.filter);
    report.issues.extend(primary_issues);
    report.issues.extend(secondary_issues);
    info!(
        "Found {} files in primary, {} files in secondary",
        primary_files.len(),
        secondary_files.len()
    );

    let mut plan: BTreeMap<String, Sources> = BTreeMap::new();
    for file in primary_files {
        plan.entry(file.relative_path).or_default().primary = Some(file.absolute_path);
    }
    for file in secondary_files {
        plan.entry(file.relative_path).or_default().secondary = Some(file.absolute_path);
    }

    reporter.on_merge_start(plan.len());

    for (relative_path, sources) in plan {
        let destination = join_relative(&request.destination, &relative_path);
        let outcome = match (sources.primary, sources.secondary) {
            (Some(primary), None) => copy_single(
                &primary,
                &destination,
                MergeAction::CopiedFromPrimary,
            )
            .map(|(mtime, written)| (MergeAction::CopiedFromPrimary, Some(mtime), None, written)),
            (None, Some(secondary)) => copy_single(
                &secondary,
                &destination,
                MergeAction::AddedFromSecondary,
            )
            .map(|(mtime, written)| (MergeAction::AddedFromSecondary, None, Some(mtime), written)),
            (Some(primary), Some(secondary)) => resolve_both(
                &primary,
                &secondary,
                &destination,
                request.timestamp_source,
            )
            .map(|(action, p, s, written)| (action, Some(p), Some(s), written)),
            (None, None) => continue,
        };

        match outcome {
            Ok((action, primary_mtime, secondary_mtime, written)) => {
                debug!("{}: {} (written: {})", relative_path, action, written);
                let entry = MergeEntry {
                    relative_path,
                    action,
                    primary_mtime,
                    secondary_mtime,
                    written,
                };
                reporter.on_merge_entry(&entry);
                report.entries.push(entry);
            }
            Err(issue) => {
                warn!("Skipping {}: {}", relative_path, issue);
                reporter.on_merge_issue(&issue);
                report.issues.push(issue);
            }
        }
    }

    report.duration = merge_start.elapsed();
    reporter.on_merge_complete(report.entries.len(), report.duration.as_secs_f64());
    info!(
        "Merged {} files into {} ({} skipped)",
        report.entries.len(),
        request.destination.display(),
        report.issues.len()
    );

    Ok(report)
}

fn copy_single(
    src: &Path,
    dst: &Path,
    action: MergeAction,
) -> Result<(SystemTime, bool), FileIssue> {
    let mtime = modified_time(src)?;
    let written = sync_file(src, dst)?;
    debug!("{} {} -> {}", action, src.display(), dst.display());
    Ok((mtime, written))
}

fn resolve_both(
    primary: &Path,
    secondary: &Path,
    destination: &Path,
    timestamp_source: TimestampSource,
) -> Result<(MergeAction, SystemTime, SystemTime, bool), FileIssue> {
    let primary_mtime = modified_time(primary)?;
    let secondary_mtime = modified_time(secondary)?;

    match timestamp_source {
        TimestampSource::Source => {
            if secondary_mtime > primary_mtime {
                let written = sync_file(secondary, destination)?;
                Ok((
                    MergeAction::UpdatedFromSecondaryNewer,
                    primary_mtime,
                    secondary_mtime,
                    written,
                ))
            } else {
                let written = sync_file(primary, destination)?;
                Ok((
                    MergeAction::KeptFromPrimaryNewer,
                    primary_mtime,
                    secondary_mtime,
                    written,
                ))
            }
        }
        TimestampSource::Destination => {
            // Primary is materialised first, then the secondary is compared
            // against whatever landed at the destination. A newer secondary
            // therefore overwrites the primary copy on every run.
            let primary_written = sync_file(primary, destination)?;
            let destination_mtime = modified_time(destination)?;
            if secondary_mtime > destination_mtime {
                let written = sync_file(secondary, destination)?;
                Ok((
                    MergeAction::UpdatedFromSecondaryNewer,
                    primary_mtime,
                    secondary_mtime,
                    written,
                ))
            } else {
                Ok((
                    MergeAction::KeptFromPrimaryNewer,
                    primary_mtime,
                    secondary_mtime,
                    primary_written,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentReporter;
    use filetime::FileTime;
    use std::cell::Cell;
    use std::fs;
    use tempfile::tempdir;

    fn write_at(root: &Path, rel: &str, content: &str, unix_secs: i64) {
        let path = join_relative(root, rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        filetime::set_file_mtime(&path, FileTime::from_unix_time(unix_secs, 0)).unwrap();
    }

    #[test]
    fn test_missing_source_root_is_error() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        let request = MergeRequest::new(
            dir.path().join("a"),
            dir.path().join("missing"),
            dir.path().join("out"),
        );
        assert!(matches!(
            merge_directories(&request, &SilentReporter),
            Err(Error::NotADirectory(_))
        ));
    }

    #[test]
    fn test_destination_mode_matches_source_mode_on_clean_destination() {
        for mode in [TimestampSource::Source, TimestampSource::Destination] {
            let dir = tempdir().unwrap();
            let a = dir.path().join("a");
            let b = dir.path().join("b");
            write_at(&a, "x.swift", "1", 1_000);
            write_at(&b, "x.swift", "2", 2_000);
            write_at(&a, "y.swift", "new primary", 5_000);
            write_at(&b, "y.swift", "old secondary", 4_000);

            let out = dir.path().join("out");
            let request = MergeRequest::new(&a, &b, &out).with_timestamp_source(mode);
            let report = merge_directories(&request, &SilentReporter).unwrap();

            assert_eq!(
                report.entry("x.swift").unwrap().action,
                MergeAction::UpdatedFromSecondaryNewer,
                "mode {:?}",
                mode
            );
            assert_eq!(
                report.entry("y.swift").unwrap().action,
                MergeAction::KeptFromPrimaryNewer,
                "mode {:?}",
                mode
            );
            assert_eq!(fs::read_to_string(out.join("x.swift")).unwrap(), "2");
            assert_eq!(fs::read_to_string(out.join("y.swift")).unwrap(), "new primary");
        }
    }

    #[test]
    fn test_equal_mtimes_keep_primary() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        write_at(&a, "x.swift", "primary", 3_000);
        write_at(&b, "x.swift", "secondary", 3_000);

        let out = dir.path().join("out");
        let report =
            merge_directories(&MergeRequest::new(&a, &b, &out), &SilentReporter).unwrap();
        assert_eq!(
            report.entries[0].action,
            MergeAction::KeptFromPrimaryNewer
        );
        assert_eq!(fs::read_to_string(out.join("x.swift")).unwrap(), "primary");
    }

    #[test]
    fn test_legacy_mode_reads_destination_timestamp() {
        // A stale destination newer than both sources: source mode still
        // compares the sources, legacy mode re-copies primary first so the
        // stale file never wins.
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let out = dir.path().join("out");
        write_at(&a, "x.swift", "primary", 1_000);
        write_at(&b, "x.swift", "secondary", 2_000);
        write_at(&out, "x.swift", "stale", 9_000);

        let request =
            MergeRequest::new(&a, &b, &out).with_timestamp_source(TimestampSource::Destination);
        let report = merge_directories(&request, &SilentReporter).unwrap();
        let entry = report.entry("x.swift").unwrap();
        assert_eq!(entry.action, MergeAction::UpdatedFromSecondaryNewer);
        assert!(entry.written);
        assert_eq!(fs::read_to_string(out.join("x.swift")).unwrap(), "secondary");
    }

    #[test]
    fn test_legacy_mode_rewrites_updated_paths_on_rerun() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let out = dir.path().join("out");
        write_at(&a, "x.swift", "primary", 1_000);
        write_at(&b, "x.swift", "secondary", 2_000);
        write_at(&a, "y.swift", "kept", 3_000);
        write_at(&b, "y.swift", "older", 2_000);

        let request =
            MergeRequest::new(&a, &b, &out).with_timestamp_source(TimestampSource::Destination);
        merge_directories(&request, &SilentReporter).unwrap();
        let rerun = merge_directories(&request, &SilentReporter).unwrap();

        assert!(rerun.entry("x.swift").unwrap().written);
        assert!(!rerun.entry("y.swift").unwrap().written);
        assert_eq!(fs::read_to_string(out.join("x.swift")).unwrap(), "secondary");
    }

    #[derive(Default)]
    struct CountingReporter {
        started: Cell<usize>,
        entries: Cell<usize>,
        issues: Cell<usize>,
    }

    impl ProgressReporter for CountingReporter {
        fn on_merge_start(&self, total_paths: usize) {
            self.started.set(total_paths);
        }
        fn on_merge_entry(&self, _entry: &MergeEntry) {
            self.entries.set(self.entries.get() + 1);
        }
        fn on_merge_issue(&self, _issue: &FileIssue) {
            self.issues.set(self.issues.get() + 1);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_paths_still_advance_progress() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        write_at(&a, "ok.swift", "ok", 1_000);
        write_at(&b, "locked.swift", "locked", 1_000);
        let locked = b.join("locked.swift");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&locked).is_ok() {
            return;
        }

        let reporter = CountingReporter::default();
        let report =
            merge_directories(&MergeRequest::new(&a, &b, dir.path().join("out")), &reporter)
                .unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

        assert_eq!(reporter.started.get(), 2);
        assert_eq!(reporter.entries.get(), 1);
        assert_eq!(reporter.issues.get(), 1);
        assert_eq!(report.issues.len(), 1);
    }
}
