// src/watch/roots.rs

//! Which directories a watch session subscribes to.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::select::{Pattern, SelectionRules};

/// Directories to watch for `rules`, rooted at `cwd`.
///
/// Every include pattern contributes the directory its literal prefix names:
/// `src/**/*.ts` watches `src`, `**/*.ts` watches the project directory. A
/// literal pattern watches itself when it is a directory, otherwise its
/// parent. Duplicates and roots nested inside another root are dropped;
/// roots that do not exist are skipped with a warning.
pub fn derive_watch_roots(fs: &dyn FileSystem, cwd: &Path, rules: &SelectionRules) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    for pattern in rules.include() {
        let Some(root) = root_for(fs, cwd, pattern) else {
            continue;
        };
        if !fs.is_dir(&root) {
            warn!(
                pattern = pattern.as_str(),
                "watch root {} does not exist; skipping",
                root.display()
            );
            continue;
        }
        if !candidates.contains(&root) {
            candidates.push(root);
        }
    }

    let roots: Vec<PathBuf> = candidates
        .iter()
        .filter(|root| {
            !candidates
                .iter()
                .any(|other| other != *root && root.starts_with(other))
        })
        .cloned()
        .collect();

    debug!(?roots, "derived watch roots");
    roots
}

fn root_for(fs: &dyn FileSystem, cwd: &Path, pattern: &Pattern) -> Option<PathBuf> {
    let base = pattern.base_dir();
    let path = if base.is_empty() {
        cwd.to_path_buf()
    } else {
        cwd.join(&base)
    };

    if pattern.is_wildcard() || fs.is_dir(&path) {
        return Some(path);
    }
    path.parent().map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn roots(fs: &MockFileSystem, include: &[&str]) -> Vec<PathBuf> {
        let rules = SelectionRules::new(include.iter().copied(), Vec::<String>::new());
        derive_watch_roots(fs, Path::new("/proj"), &rules)
    }

    #[test]
    fn wildcard_patterns_watch_their_literal_prefix() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/src/a.ts", "");
        fs.add_file("/proj/lib/core/b.ts", "");

        assert_eq!(
            roots(&fs, &["src/**/*.ts", "src/**/*.tsx", "lib/core/*.ts"]),
            vec![PathBuf::from("/proj/src"), PathBuf::from("/proj/lib/core")]
        );
    }

    #[test]
    fn nested_roots_collapse_into_their_ancestor() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/src/a.ts", "");

        assert_eq!(
            roots(&fs, &["src/**/*.ts", "**/*.ts"]),
            vec![PathBuf::from("/proj")]
        );
    }

    #[test]
    fn literal_file_watches_its_parent() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/config/app.ts", "");
        fs.add_dir("/proj/scripts");

        assert_eq!(
            roots(&fs, &["config/app.ts", "scripts"]),
            vec![PathBuf::from("/proj/config"), PathBuf::from("/proj/scripts")]
        );
    }

    #[test]
    fn missing_roots_are_skipped() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/src/a.ts", "");

        assert_eq!(
            roots(&fs, &["packages/**/*.ts", "src/**/*.ts"]),
            vec![PathBuf::from("/proj/src")]
        );
    }
}
