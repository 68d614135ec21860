use crate::config::Location;
use crate::inventory::Inventory;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
    /// The location root itself does not exist.
    LocationMissing,
}

impl Presence {
    pub fn symbol(&self) -> &'static str {
        match self {
            Presence::Present => "✓",
            Presence::Absent => "✗",
            Presence::LocationMissing => "N/A",
        }
    }
}

/// Which locations hold a given relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceRow {
    pub relative_path: String,
    /// One state per location, in configured location order.
    pub states: Vec<Presence>,
}

impl PresenceRow {
    pub fn present_count(&self) -> usize {
        self.states
            .iter()
            .filter(|s| **s == Presence::Present)
            .count()
    }
}

/// The union of all inventoried relative paths, sorted, with their presence in
/// each location.
pub fn build_presence_table(locations: &[Location], inventory: &Inventory) -> Vec<PresenceRow> {
    let present: HashSet<(&str, &str)> = inventory
        .records
        .iter()
        .map(|r| (r.location.as_str(), r.relative_path.as_str()))
        .collect();
    let all_paths: BTreeSet<&str> = inventory
        .records
        .iter()
        .map(|r| r.relative_path.as_str())
        .collect();

    all_paths
        .into_iter()
        .map(|relative_path| {
            let states = locations
                .iter()
                .map(|location| {
                    if inventory.is_location_missing(&location.name) {
                        Presence::LocationMissing
                    } else if present.contains(&(location.name.as_str(), relative_path)) {
                        Presence::Present
                    } else {
                        Presence::Absent
                    }
                })
                .collect();
            PresenceRow {
                relative_path: relative_path.to_string(),
                states,
            }
        })
        .collect()
}
