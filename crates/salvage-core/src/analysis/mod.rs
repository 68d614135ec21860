pub mod conflicts;
pub mod duplicates;
pub mod presence;

pub use conflicts::{build_conflict_groups, ConflictGroup};
pub use duplicates::{build_content_groups, DuplicateGroup};
pub use presence::{build_presence_table, Presence, PresenceRow};
