// src/select/path_utils.rs

//! Path helpers shared by selection and the watcher.

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths and try again. This matters for watcher
///   events on platforms (notably macOS) that report `/private/var/...` for
///   a root given as `/var/...`.
///
/// Returns `None` if the path cannot be related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(to_slash(rel));
        }
    }

    None
}

/// Render a relative path with `/` separators on every platform.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn strips_root_prefix() {
        let root = PathBuf::from("/proj");
        let path = PathBuf::from("/proj/src/a.ts");
        assert_eq!(relative_str(&root, &path).as_deref(), Some("src/a.ts"));
    }

    #[test]
    fn unrelated_paths_are_rejected() {
        let root = PathBuf::from("/definitely/not/here");
        let path = PathBuf::from("/elsewhere/a.ts");
        assert_eq!(relative_str(&root, &path), None);
    }
}
