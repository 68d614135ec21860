use crate::analysis::{ConflictGroup, DuplicateGroup, PresenceRow};
use crate::config::Location;
use crate::error::Error;
use crate::merge::MergeReport;
use chrono::{DateTime, Utc};
use csv::Writer;
use std::io;
use std::path::Path;
use std::time::SystemTime;

pub const DUPLICATES_CSV: &str = "duplicates_by_content.csv";
pub const CONFLICTS_CSV: &str = "conflicts_by_path.csv";
pub const PRESENCE_CSV: &str = "file_comparison_list.csv";

/// One row per duplicate group: fingerprint, count, `rel | location` details.
pub fn write_duplicates<W: io::Write>(groups: &[DuplicateGroup], out: W) -> Result<(), Error> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(["fingerprint", "count", "details (rel_path | location)"])?;
    for group in groups {
        writer.write_record([
            group.fingerprint.to_hex(),
            group.len().to_string(),
            group.details(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// One row per (relative path, location, fingerprint) tuple.
pub fn write_conflicts<W: io::Write>(conflicts: &[ConflictGroup], out: W) -> Result<(), Error> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(["rel_path", "location", "fingerprint"])?;
    for conflict in conflicts {
        for member in &conflict.members {
            writer.write_record([
                conflict.relative_path.as_str(),
                member.location.as_str(),
                member.fingerprint.to_hex().as_str(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// `file, <location>...` with ✓ / ✗ / N/A cells.
pub fn write_presence<W: io::Write>(
    locations: &[Location],
    rows: &[PresenceRow],
    out: W,
) -> Result<(), Error> {
    let mut writer = Writer::from_writer(out);
    let mut header = vec!["file"];
    header.extend(locations.iter().map(|l| l.name.as_str()));
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.relative_path.as_str()];
        record.extend(row.states.iter().map(|s| s.symbol()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// The merge audit trail: one row per relative path.
pub fn write_merge_audit<W: io::Write>(report: &MergeReport, out: W) -> Result<(), Error> {
    let mut writer = Writer::from_writer(out);
    writer.write_record([
        "rel_path",
        "action",
        "primary_mtime",
        "secondary_mtime",
        "written",
    ])?;
    for entry in &report.entries {
        writer.write_record([
            entry.relative_path.clone(),
            entry.action.as_str().to_string(),
            format_mtime(entry.primary_mtime),
            format_mtime(entry.secondary_mtime),
            entry.written.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Create `path` (and its parent directory) and run `write` against it.
pub fn write_report_file<F>(path: &Path, write: F) -> Result<(), Error>
where
    F: FnOnce(std::fs::File) -> Result<(), Error>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write(file)
}

pub fn format_mtime(time: Option<SystemTime>) -> String {
    time.map(|t| DateTime::<Utc>::from(t).to_rfc3339())
        .unwrap_or_default()
}
