use std::fs;
use std::path::Path;
use tempfile::tempdir;

use salvage_core::analysis::{build_conflict_groups, build_content_groups, build_presence_table, Presence};
use salvage_core::report;
use salvage_core::{scan_locations, FileFilter, Location, SilentReporter};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Create three locations with known duplicates and conflicts.
/// Layout:
///   current/
///     App/App.swift          ("app v1")
///     Views/Map.swift        ("map v1")
///     Views/Splash.swift     ("splash")
///   backup/
///     App/App.swift          ("app v1")      ← identical, not a conflict
///     Views/Map.swift        ("map v2")      ← conflict with current
///     Old/Splash copy.swift  ("splash")      ← duplicate at a different path
///     README.md              ("ignored")     ← wrong extension
///   music/                   (does not exist)
fn create_locations(root: &Path) -> Vec<Location> {
    let current = root.join("current");
    let backup = root.join("backup");

    write(&current, "App/App.swift", "app v1");
    write(&current, "Views/Map.swift", "map v1");
    write(&current, "Views/Splash.swift", "splash");

    write(&backup, "App/App.swift", "app v1");
    write(&backup, "Views/Map.swift", "map v2");
    write(&backup, "Old/Splash copy.swift", "splash");
    write(&backup, "README.md", "ignored");

    vec![
        Location::new("current", current),
        Location::new("backup", backup),
        Location::new("music", root.join("music")),
    ]
}

#[test]
fn test_full_scan_pipeline() {
    let tmp = tempdir().unwrap();
    let locations = create_locations(tmp.path());

    let inventory = scan_locations(
        &locations,
        &FileFilter::with_extension("swift"),
        &SilentReporter,
    );

    assert_eq!(inventory.records.len(), 6);
    assert_eq!(inventory.missing_locations, vec!["music".to_string()]);
    assert!(inventory.issues.is_empty());

    // 1) App.swift in both locations, 2) Splash under two paths
    let duplicates = build_content_groups(&inventory.records);
    assert_eq!(duplicates.len(), 2);
    for group in &duplicates {
        assert_eq!(group.len(), 2, "Each duplicate group should have 2 files");
    }
    let splash = duplicates
        .iter()
        .find(|g| g.members.iter().any(|m| m.relative_path == "Views/Splash.swift"))
        .unwrap();
    assert_eq!(
        splash.details(),
        "Old/Splash copy.swift | backup; Views/Splash.swift | current"
    );

    // Only Map.swift diverges; App.swift is identical everywhere.
    let conflicts = build_conflict_groups(&inventory.records);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].relative_path, "Views/Map.swift");
    let conflict_locations: Vec<_> = conflicts[0]
        .members
        .iter()
        .map(|m| m.location.as_str())
        .collect();
    assert_eq!(conflict_locations, vec!["backup", "current"]);

    let presence = build_presence_table(&locations, &inventory);
    let paths: Vec<_> = presence.iter().map(|r| r.relative_path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "App/App.swift",
            "Old/Splash copy.swift",
            "Views/Map.swift",
            "Views/Splash.swift",
        ]
    );
    assert_eq!(
        presence[1].states,
        vec![Presence::Absent, Presence::Present, Presence::LocationMissing]
    );
}

#[test]
fn test_reports_written_to_out_dir() {
    let tmp = tempdir().unwrap();
    let locations = create_locations(tmp.path());
    let inventory = scan_locations(
        &locations,
        &FileFilter::with_extension("swift"),
        &SilentReporter,
    );
    let duplicates = build_content_groups(&inventory.records);
    let conflicts = build_conflict_groups(&inventory.records);

    let out_dir = tmp.path().join("reports");
    let dup_path = out_dir.join(report::DUPLICATES_CSV);
    let conflict_path = out_dir.join(report::CONFLICTS_CSV);
    report::write_report_file(&dup_path, |f| report::write_duplicates(&duplicates, f)).unwrap();
    report::write_report_file(&conflict_path, |f| report::write_conflicts(&conflicts, f))
        .unwrap();

    let dup_csv = fs::read_to_string(&dup_path).unwrap();
    assert_eq!(dup_csv.lines().count(), 3);

    let conflict_csv = fs::read_to_string(&conflict_path).unwrap();
    let rows: Vec<_> = conflict_csv.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("Views/Map.swift,backup,"));
    assert!(rows[1].starts_with("Views/Map.swift,current,"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_does_not_abort_scan() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempdir().unwrap();
    let root = tmp.path().join("current");
    write(&root, "a.swift", "a");
    write(&root, "b.swift", "b");
    let locked = root.join("b.swift");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root can read anything; nothing to assert in that case.
    if fs::read(&locked).is_ok() {
        return;
    }

    let locations = vec![Location::new("current", &root)];
    let inventory = scan_locations(&locations, &FileFilter::all(), &SilentReporter);
    assert_eq!(inventory.records.len(), 1);
    assert_eq!(inventory.records[0].relative_path, "a.swift");
    assert_eq!(inventory.issues.len(), 1);
    assert_eq!(inventory.issues[0].reason, salvage_core::ReasonCode::Unreadable);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}
