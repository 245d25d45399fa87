//! Filesystem tools for file operations
//!
//! Relative paths resolve against the session working directory;
//! absolute paths are used as given.

mod edit;
mod glob;
mod grep;
mod list;
mod path_utils;
mod read;
mod write;

pub use edit::{apply_replacement, EditFile, Replacement};
pub use glob::{compile_glob, FindFiles};
pub use grep::SearchContent;
pub use list::ListFiles;
pub use read::ReadFile;
pub use write::CreateFile;

pub use path_utils::{canonical_or_normalized, normalize_path, path_to_display, relative_display};
