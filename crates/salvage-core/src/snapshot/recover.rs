use super::classify::{classify_filename, Category};
use super::parse::{recover_snapshot, SnapshotForm};
use crate::error::{Error, FileIssue, ReasonCode};
use glob::Pattern;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Asset catalogue manifests share the cache but hold no source.
const SKIPPED_SNAPSHOT_NAMES: &[&str] = &["Contents.json"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredFile {
    pub snapshot: PathBuf,
    pub output: PathBuf,
    pub form: SnapshotForm,
    pub bytes: usize,
}

#[derive(Debug, Default)]
pub struct RecoveryReport {
    pub recovered: Vec<RecoveredFile>,
    pub issues: Vec<FileIssue>,
}

/// Name of the source file a cached snapshot belongs to:
/// `Foo.swift.2ae67d4e.json`, `Foo.2ae6.json` and `Foo.json` all map to
/// `Foo.swift` for extension `swift`.
pub fn snapshot_target_name(snapshot_name: &str, extension: &str) -> Option<String> {
    let stem = snapshot_name.strip_suffix(".json")?;
    let base = stem.split('.').next().filter(|b| !b.is_empty())?;
    Some(format!("{}.{}", base, extension.trim_start_matches('.')))
}

/// Where a recovered file goes under `root`: `root/<Category>/<file_name>`.
pub fn categorized_output_path(root: &Path, file_name: &str) -> (Category, PathBuf) {
    let category = classify_filename(file_name);
    (category, root.join(category.dir_name()).join(file_name))
}

/// Newest snapshot named `"{file_name}.*json"`. Cache directories are tried in
/// order and the first one holding any match wins.
pub fn find_latest_snapshot(cache_dirs: &[PathBuf], file_name: &str) -> Option<PathBuf> {
    for dir in cache_dirs {
        let pattern = format!(
            "{}/{}.*json",
            Pattern::escape(&dir.to_string_lossy()),
            Pattern::escape(file_name)
        );
        let entries = match glob::glob(&pattern) {
            Ok(paths) => paths.filter_map(Result::ok).collect::<Vec<_>>(),
            Err(e) => {
                warn!("Bad snapshot pattern '{}': {}", pattern, e);
                continue;
            }
        };
        if let Some(newest) = newest_by_mtime(entries) {
            debug!("Latest snapshot for {}: {}", file_name, newest.display());
            return Some(newest);
        }
    }
    None
}

fn newest_by_mtime(paths: Vec<PathBuf>) -> Option<PathBuf> {
    paths
        .into_iter()
        .map(|p| {
            let mtime = fs::metadata(&p)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (mtime, p)
        })
        // Later path wins an mtime tie, so the choice does not depend on
        // directory listing order.
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, p)| p)
}

/// Recover one snapshot into `output`, creating parent directories.
pub fn recover_file(snapshot: &Path, output: &Path) -> Result<RecoveredFile, FileIssue> {
    let raw = fs::read(snapshot).map_err(|e| FileIssue::new(snapshot, ReasonCode::Unreadable, e))?;
    let recovery = recover_snapshot(&raw);

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|e| FileIssue::new(output, ReasonCode::WriteFailed, e))?;
    }
    fs::write(output, &recovery.content)
        .map_err(|e| FileIssue::new(output, ReasonCode::WriteFailed, e))?;

    info!(
        "Recovered {} -> {} ({:?})",
        snapshot.display(),
        output.display(),
        recovery.form
    );
    Ok(RecoveredFile {
        snapshot: snapshot.to_path_buf(),
        output: output.to_path_buf(),
        form: recovery.form,
        bytes: recovery.content.len(),
    })
}

/// Recover every `*.json` snapshot directly inside `source` into
/// `destination/<Category>/<name>.<extension>`. When several snapshots map to
/// the same file the newest one is used.
pub fn recover_folder(
    source: &Path,
    destination: &Path,
    extension: &str,
) -> Result<RecoveryReport, Error> {
    if !source.is_dir() {
        return Err(Error::NotADirectory(source.to_path_buf()));
    }

    let mut by_target: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for entry in fs::read_dir(source)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name() {
            Some(n) => n.to_string_lossy().into_owned(),
            None => continue,
        };
        if SKIPPED_SNAPSHOT_NAMES.iter().any(|s| name.contains(s)) {
            debug!("Skipping {}", name);
            continue;
        }
        if let Some(target) = snapshot_target_name(&name, extension) {
            by_target.entry(target).or_default().push(path);
        }
    }
    info!(
        "Found {} recoverable files in {}",
        by_target.len(),
        source.display()
    );

    let mut report = RecoveryReport::default();
    for (target, snapshots) in by_target {
        let Some(snapshot) = newest_by_mtime(snapshots) else {
            continue;
        };
        let (_, output) = categorized_output_path(destination, &target);
        match recover_file(&snapshot, &output) {
            Ok(recovered) => report.recovered.push(recovered),
            Err(issue) => {
                warn!("Could not recover {}: {}", target, issue);
                report.issues.push(issue);
            }
        }
    }
    Ok(report)
}

/// For each file name, recover its newest cached snapshot into
/// `destination/<Category>/<name>`.
pub fn recover_named(cache_dirs: &[PathBuf], names: &[String], destination: &Path) -> RecoveryReport {
    let mut report = RecoveryReport::default();
    for name in names {
        let Some(snapshot) = find_latest_snapshot(cache_dirs, name) else {
            warn!("No snapshot found for {}", name);
            report.issues.push(FileIssue::new(
                name,
                ReasonCode::SnapshotNotFound,
                "no matching snapshot in any cache directory",
            ));
            continue;
        };
        let (_, output) = categorized_output_path(destination, name);
        match recover_file(&snapshot, &output) {
            Ok(recovered) => report.recovered.push(recovered),
            Err(issue) => {
                warn!("Could not recover {}: {}", name, issue);
                report.issues.push(issue);
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tempfile::tempdir;

    #[test]
    fn test_snapshot_target_name() {
        assert_eq!(
            snapshot_target_name("SplashScreen.swift.2ae67d4e.json", "swift"),
            Some("SplashScreen.swift".to_string())
        );
        assert_eq!(
            snapshot_target_name("MapView.2ae6.json", "swift"),
            Some("MapView.swift".to_string())
        );
        assert_eq!(
            snapshot_target_name("Notes.json", ".txt"),
            Some("Notes.txt".to_string())
        );
        assert_eq!(snapshot_target_name("Notes.swift", "swift"), None);
        assert_eq!(snapshot_target_name(".hidden.json", "swift"), None);
    }

    #[test]
    fn test_find_latest_snapshot_prefers_first_dir_then_newest() {
        let dir = tempdir().unwrap();
        let recent = dir.path().join("recent");
        let older = dir.path().join("older");
        fs::create_dir_all(&recent).unwrap();
        fs::create_dir_all(&older).unwrap();

        let a = recent.join("AuthView.swift.aaaa.json");
        let b = recent.join("AuthView.swift.bbbb.json");
        let c = older.join("AuthView.swift.cccc.json");
        for (path, secs) in [(&a, 2_000), (&b, 1_000), (&c, 9_000)] {
            fs::write(path, "\"x\"").unwrap();
            filetime::set_file_mtime(path, FileTime::from_unix_time(secs, 0)).unwrap();
        }
        // Different file sharing a prefix must not match.
        fs::write(recent.join("AuthViewModel.swift.dddd.json"), "\"y\"").unwrap();

        let dirs = vec![dir.path().join("empty"), recent.clone(), older.clone()];
        assert_eq!(find_latest_snapshot(&dirs, "AuthView.swift"), Some(a));
        assert_eq!(
            find_latest_snapshot(&[older], "AuthView.swift"),
            Some(c)
        );
        assert_eq!(find_latest_snapshot(&dirs, "Missing.swift"), None);
    }

    #[test]
    fn test_recover_folder_categorizes_and_skips_manifests() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("cache");
        let dst = dir.path().join("fixed");
        fs::create_dir_all(&src).unwrap();

        fs::write(
            src.join("SplashScreen.swift.1234.json"),
            r#"{"documentChunks":[{"range":{"start":6},"chunk":"Screen"},{"range":{"start":0},"chunk":"Splash"}]}"#,
        )
        .unwrap();
        fs::write(src.join("FontManager.json"), r#""font code""#).unwrap();
        fs::write(src.join("Contents.json"), r#"{"images":[]}"#).unwrap();

        let report = recover_folder(&src, &dst, "swift").unwrap();
        assert!(report.issues.is_empty());
        assert_eq!(report.recovered.len(), 2);
        assert_eq!(
            fs::read_to_string(dst.join("Views").join("SplashScreen.swift")).unwrap(),
            "SplashScreen"
        );
        assert_eq!(
            fs::read_to_string(dst.join("Services").join("FontManager.swift")).unwrap(),
            "font code"
        );
        assert!(!dst.join("Utils").join("Contents.swift").exists());
    }

    #[test]
    fn test_recover_named_reports_missing() {
        let dir = tempdir().unwrap();
        let cache = dir.path().join("cache");
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("AuthState.swift.01.json"), "not json at all").unwrap();

        let names = vec!["AuthState.swift".to_string(), "Gone.swift".to_string()];
        let out = dir.path().join("out");
        let report = recover_named(&[cache], &names, &out);

        assert_eq!(report.recovered.len(), 1);
        assert_eq!(report.recovered[0].form, SnapshotForm::Raw);
        assert_eq!(
            fs::read_to_string(out.join("Authentication").join("AuthState.swift")).unwrap(),
            "not json at all"
        );
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].reason, ReasonCode::SnapshotNotFound);
    }
}
