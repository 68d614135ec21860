use crate::inventory::FileRecord;
use std::collections::{BTreeMap, HashSet};

/// One relative path whose content diverges between locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictGroup {
    pub relative_path: String,
    /// Every record under the path, sorted by location name.
    pub members: Vec<FileRecord>,
}

impl ConflictGroup {
    pub fn distinct_fingerprints(&self) -> usize {
        self.members
            .iter()
            .map(|m| m.fingerprint)
            .collect::<HashSet<_>>()
            .len()
    }

    /// `"loc (abc123), loc (def456)"` for console summaries.
    pub fn summary(&self) -> String {
        self.members
            .iter()
            .map(|m| format!("{} ({})", m.location, m.fingerprint.short()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Group records by relative path, keeping paths with at least two distinct
/// fingerprints. Sorted by relative path.
pub fn build_conflict_groups(records: &[FileRecord]) -> Vec<ConflictGroup> {
    let mut by_path: BTreeMap<&str, Vec<FileRecord>> = BTreeMap::new();
    for record in records {
        by_path
            .entry(record.relative_path.as_str())
            .or_default()
            .push(record.clone());
    }

    by_path
        .into_iter()
        .filter_map(|(relative_path, mut members)| {
            members.sort_by(|a, b| a.location.cmp(&b.location));
            let group = ConflictGroup {
                relative_path: relative_path.to_string(),
                members,
            };
            (group.distinct_fingerprints() > 1).then_some(group)
        })
        .collect()
}
