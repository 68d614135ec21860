use crate::error::{FileIssue, ReasonCode};
use glob::Pattern;
use std::path::{Component, Path, PathBuf};
use tracing::{error, warn};
use walkdir::{DirEntry, WalkDir};

/// Which files a walk keeps: an optional extension plus glob ignore patterns.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    extension: Option<String>,
    ignore_patterns: Vec<Pattern>,
}

impl FileFilter {
    pub fn new(extension: Option<&str>, ignore_globs: &[String]) -> Self {
        let ignore_patterns: Vec<Pattern> = ignore_globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();

        Self {
            extension: extension
                .map(|e| e.trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty()),
            ignore_patterns,
        }
    }

    /// Keep every file.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_extension(extension: &str) -> Self {
        Self::new(Some(extension), &[])
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        match &self.extension {
            None => true,
            Some(ext) => path
                .extension()
                .map(|e| e.to_string_lossy() == ext.as_str())
                .unwrap_or(false),
        }
    }
}

/// A regular file found under a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Path relative to the root, `/`-separated.
    pub relative_path: String,
    pub absolute_path: PathBuf,
}

/// Recursively list the regular files under `root` that pass `filter`,
/// sorted by relative path. Symlinks are not followed. Unreadable
/// directories are reported as issues and skipped.
pub fn walk_files(root: &Path, filter: &FileFilter) -> (Vec<WalkedFile>, Vec<FileIssue>) {
    let mut files = Vec::new();
    let mut issues = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_ignored_dir(entry, filter));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                warn!("Skipping {}: {}", path.display(), err);
                issues.push(FileIssue::new(path, ReasonCode::Unreadable, err));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !filter.matches_extension(path) || filter.is_ignored(path) {
            continue;
        }

        if let Some(relative_path) = relative_path_string(root, path) {
            files.push(WalkedFile {
                relative_path,
                absolute_path: path.to_path_buf(),
            });
        }
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    (files, issues)
}

fn is_ignored_dir(entry: &DirEntry, filter: &FileFilter) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && filter.is_ignored(entry.path())
}

/// `path` relative to `root`, joined with `/` regardless of platform.
pub fn relative_path_string(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Inverse of [`relative_path_string`]: resolve a `/`-separated relative
/// path under `root`.
pub fn join_relative(root: &Path, relative_path: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for part in relative_path.split('/').filter(|p| !p.is_empty()) {
        path.push(part);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = join_relative(root, rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_walk_filters_extension_and_sorts() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Views/B.swift", "b");
        touch(dir.path(), "App/A.swift", "a");
        touch(dir.path(), "App/notes.txt", "n");

        let (files, issues) = walk_files(dir.path(), &FileFilter::with_extension("swift"));
        assert!(issues.is_empty());
        let rels: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(rels, vec!["App/A.swift", "Views/B.swift"]);
        assert_eq!(files[0].absolute_path, dir.path().join("App").join("A.swift"));
    }

    #[test]
    fn test_walk_all_files_when_no_extension() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.swift", "a");
        touch(dir.path(), "b.txt", "b");

        let (files, _) = walk_files(dir.path(), &FileFilter::all());
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_walk_skips_ignored_directories() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "App/A.swift", "a");
        touch(dir.path(), ".build/Gen.swift", "g");

        let filter = FileFilter::new(Some("swift"), &["*/.build".to_string()]);
        let (files, _) = walk_files(dir.path(), &filter);
        let rels: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(rels, vec!["App/A.swift"]);
    }

    #[test]
    fn test_invalid_glob_is_dropped() {
        let filter = FileFilter::new(None, &["[".to_string()]);
        assert!(!filter.is_ignored(Path::new("/anything")));
    }

    #[test]
    fn test_relative_path_round_trip() {
        let root = Path::new("/root/project");
        let path = root.join("Views").join("Main.swift");
        let rel = relative_path_string(root, &path).unwrap();
        assert_eq!(rel, "Views/Main.swift");
        assert_eq!(join_relative(root, &rel), path);
        assert_eq!(relative_path_string(root, root), None);
        assert_eq!(relative_path_string(root, Path::new("/elsewhere/x")), None);
    }
}
