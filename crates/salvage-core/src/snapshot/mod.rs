pub mod classify;
pub mod parse;
pub mod recover;

pub use classify::{classify_filename, Category, CategoryRule, CATEGORY_RULES};
pub use parse::{reassemble_chunks, recover_snapshot, Recovery, SnapshotChunk, SnapshotForm};
pub use recover::{
    categorized_output_path, find_latest_snapshot, recover_file, recover_folder, recover_named,
    snapshot_target_name, RecoveredFile, RecoveryReport,
};
