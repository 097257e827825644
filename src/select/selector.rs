// src/select/selector.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::select::path_utils::relative_str;
use crate::select::patterns::{Pattern, SelectionRules};

/// Ordered, duplicate-free list of absolute file paths.
///
/// Built once per selection pass and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    paths: Vec<PathBuf>,
}

impl FileSet {
    /// Build from paths, keeping the first occurrence of each.
    pub fn from_paths<I: IntoIterator<Item = PathBuf>>(paths: I) -> Self {
        let mut seen = HashSet::new();
        let paths = paths
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();
        Self { paths }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn into_vec(self) -> Vec<PathBuf> {
        self.paths
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Resolves [`SelectionRules`] against the project directory.
#[derive(Debug, Clone)]
pub struct FileSelector {
    fs: Arc<dyn FileSystem>,
    cwd: PathBuf,
    rules: SelectionRules,
}

impl FileSelector {
    /// `cwd` is canonicalised once so every selected path shares one
    /// absolute prefix.
    pub fn new(fs: Arc<dyn FileSystem>, cwd: impl Into<PathBuf>, rules: SelectionRules) -> Self {
        let cwd = cwd.into();
        let cwd = fs.canonicalize(&cwd).unwrap_or(cwd);
        Self { fs, cwd, rules }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn rules(&self) -> &SelectionRules {
        &self.rules
    }

    /// Run one selection pass.
    ///
    /// Include patterns are evaluated in order; matches of a single pattern
    /// are sorted by path. Excluded paths are dropped and duplicates keep
    /// their first position. Unreadable directories are skipped with a
    /// warning.
    pub fn select(&self) -> FileSet {
        let mut ordered = Vec::new();

        for pattern in self.rules.include() {
            let mut matched = self.matches_for(pattern);
            matched.sort();
            debug!(
                pattern = pattern.as_str(),
                matched = matched.len(),
                "evaluated include pattern"
            );

            for path in matched {
                let Some(rel) = relative_str(&self.cwd, &path) else {
                    continue;
                };
                if self.rules.is_excluded(&rel) {
                    continue;
                }
                ordered.push(path);
            }
        }

        let files = FileSet::from_paths(ordered);
        debug!(files = files.len(), "selection complete");
        files
    }

    /// Every file below the pattern's base directory that the pattern matches.
    fn matches_for(&self, pattern: &Pattern) -> Vec<PathBuf> {
        let base_rel = pattern.base_dir();
        let base = if base_rel.is_empty() {
            self.cwd.clone()
        } else {
            self.cwd.join(&base_rel)
        };

        if !pattern.is_wildcard() {
            if self.fs.is_file(&base) {
                return vec![base];
            }
            if self.fs.is_dir(&base) {
                return self.walk_files(&base, |_| true);
            }
            return Vec::new();
        }

        if !self.fs.is_dir(&base) {
            return Vec::new();
        }
        self.walk_files(&base, |rel| pattern.matches(rel))
    }

    /// Depth-first walk collecting files whose relative path passes `keep`.
    ///
    /// Symlinked directories are not followed; directories covered by a
    /// literal exclude are not entered.
    fn walk_files(&self, root: &Path, keep: impl Fn(&str) -> bool) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut stack = vec![root.to_path_buf()];

        while let Some(dir) = stack.pop() {
            let entries = match self.fs.read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("skipping unreadable directory {}: {err:#}", dir.display());
                    continue;
                }
            };

            for path in entries {
                let Some(rel) = relative_str(&self.cwd, &path) else {
                    continue;
                };
                if self.fs.is_dir(&path) {
                    if self.fs.is_symlink(&path) || self.rules.prunes_dir(&rel) {
                        continue;
                    }
                    stack.push(path);
                } else if self.fs.is_file(&path) && keep(&rel) {
                    files.push(path);
                }
            }
        }

        files
    }
}
