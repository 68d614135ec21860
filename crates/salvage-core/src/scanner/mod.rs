pub mod walk;

pub use walk::{join_relative, relative_path_string, walk_files, FileFilter, WalkedFile};
