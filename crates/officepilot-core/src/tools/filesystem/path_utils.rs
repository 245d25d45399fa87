//! Path helpers shared by the filesystem tools

use std::path::{Component, Path, PathBuf};

/// Convert a path to a display string with forward slash separators
pub fn path_to_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Display `path` relative to `base` when it lives underneath it
pub fn relative_display(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .map(path_to_display)
        .unwrap_or_else(|_| path_to_display(path))
}

/// Lexically normalize a path, collapsing `.` and `..` without touching the disk
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonicalize an existing path without the `\\?\` prefix on Windows,
/// falling back to lexical normalization for paths that do not exist yet
pub fn canonical_or_normalized(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| normalize_path(path))
}

/// Whether a file name marks a hidden entry
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(
            normalize_path(Path::new("/a/b/../c/./d.txt")),
            PathBuf::from("/a/c/d.txt")
        );
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn relative_display_strips_base() {
        assert_eq!(
            relative_display(Path::new("/w/docs/a.docx"), Path::new("/w")),
            "docs/a.docx"
        );
        assert_eq!(relative_display(Path::new("/other/a"), Path::new("/w")), "/other/a");
    }

    #[test]
    fn hidden_names() {
        assert!(is_hidden(".git"));
        assert!(!is_hidden("."));
        assert!(!is_hidden("report.xlsx"));
    }
}
