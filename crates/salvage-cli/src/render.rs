use colored::*;
use salvage_core::analysis::{ConflictGroup, PresenceRow};
use salvage_core::merge::{MergeAction, MergeEntry, MergeSummary};
use salvage_core::{FileIssue, Location};
use std::io::{self, Write};

const PATH_WIDTH: usize = 40;
const LOCATION_WIDTH: usize = 8;

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn rule<W: Write>(out: &mut W, width: usize) -> io::Result<()> {
    writeln!(out, "{}", "-".repeat(width))
}

/// Numbered table of relative paths against locations. `limit` caps the rows.
pub fn presence_table<W: Write>(
    out: &mut W,
    locations: &[Location],
    rows: &[PresenceRow],
    limit: Option<usize>,
) -> io::Result<()> {
    let width = 12 + PATH_WIDTH + locations.len() * (LOCATION_WIDTH + 3);
    rule(out, width)?;
    let mut header = format!("| {:<3} | {:<PATH_WIDTH$} |", "#", "File Path");
    for location in locations {
        header += &format!(" {:<LOCATION_WIDTH$} |", truncate(&location.name, LOCATION_WIDTH));
    }
    writeln!(out, "{}", header)?;
    rule(out, width)?;

    let shown = limit.unwrap_or(rows.len()).min(rows.len());
    for (i, row) in rows.iter().take(shown).enumerate() {
        let mut line = format!(
            "| {:<3} | {:<PATH_WIDTH$} |",
            i + 1,
            truncate(&row.relative_path, PATH_WIDTH)
        );
        for state in &row.states {
            line += &format!(" {:<LOCATION_WIDTH$} |", state.symbol());
        }
        writeln!(out, "{}", line)?;
    }
    if shown < rows.len() {
        writeln!(out, "... and {} more files", rows.len() - shown)?;
    }
    rule(out, width)
}

/// `path: loc (abc123), loc (def456)` for the first `limit` conflicts.
pub fn conflict_sample<W: Write>(
    out: &mut W,
    conflicts: &[ConflictGroup],
    limit: usize,
) -> io::Result<()> {
    if conflicts.is_empty() {
        return writeln!(out, "{}", "No path conflicts.".green());
    }
    writeln!(out, "Sample conflicts (first {}):", limit.min(conflicts.len()))?;
    for conflict in conflicts.iter().take(limit) {
        writeln!(
            out,
            "  - {}: {}",
            conflict.relative_path.yellow(),
            conflict.summary()
        )?;
    }
    Ok(())
}

pub fn merge_line(entry: &MergeEntry) -> String {
    let path = &entry.relative_path;
    match entry.action {
        MergeAction::CopiedFromPrimary => format!("{} {} (from primary)", "Copied:".green(), path),
        MergeAction::UpdatedFromSecondaryNewer => {
            format!("{} {} (from secondary - newer)", "Updated:".cyan(), path)
        }
        MergeAction::KeptFromPrimaryNewer => {
            format!("{} {} (from primary - newer)", "Kept:".yellow(), path)
        }
        MergeAction::AddedFromSecondary => format!("{} {} (from secondary)", "Added:".blue(), path),
    }
}

pub fn merge_audit<W: Write>(out: &mut W, entries: &[MergeEntry]) -> io::Result<()> {
    for entry in entries {
        writeln!(out, "{}", merge_line(entry))?;
    }
    Ok(())
}

pub fn merge_summary<W: Write>(out: &mut W, summary: &MergeSummary) -> io::Result<()> {
    writeln!(
        out,
        "{} files merged: {} copied, {} updated, {} kept, {} added ({} written, {} failed)",
        format!("{}", summary.total()).green(),
        summary.copied,
        summary.updated,
        summary.kept,
        summary.added,
        summary.written,
        format!("{}", summary.failed).red(),
    )
}

pub fn issues<W: Write>(out: &mut W, issues: &[FileIssue]) -> io::Result<()> {
    if issues.is_empty() {
        return Ok(());
    }
    writeln!(out, "{} files skipped:", format!("{}", issues.len()).red())?;
    for issue in issues {
        writeln!(out, "  {}", issue)?;
    }
    Ok(())
}
