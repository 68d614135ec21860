use crate::hasher::ContentFingerprint;
use crate::inventory::FileRecord;
use std::collections::HashMap;

/// Files sharing byte-identical content, possibly at different paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub fingerprint: ContentFingerprint,
    /// Sorted by (relative path, location).
    pub members: Vec<FileRecord>,
}

impl DuplicateGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// `"rel | location; rel | location"`, as written to the CSV report.
    pub fn details(&self) -> String {
        self.members
            .iter()
            .map(|m| format!("{} | {}", m.relative_path, m.location))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Group records by fingerprint, keeping groups with 2+ members.
///
/// Groups come back largest first; equal sizes are ordered by fingerprint so
/// the report is stable between runs.
pub fn build_content_groups(records: &[FileRecord]) -> Vec<DuplicateGroup> {
    let mut by_fingerprint: HashMap<ContentFingerprint, Vec<FileRecord>> = HashMap::new();
    for record in records {
        by_fingerprint
            .entry(record.fingerprint)
            .or_default()
            .push(record.clone());
    }

    let mut groups: Vec<DuplicateGroup> = by_fingerprint
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(fingerprint, mut members)| {
            members.sort_by(|a, b| {
                a.relative_path
                    .cmp(&b.relative_path)
                    .then_with(|| a.location.cmp(&b.location))
            });
            DuplicateGroup {
                fingerprint,
                members,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| a.fingerprint.cmp(&b.fingerprint))
    });
    groups
}
