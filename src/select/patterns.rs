// src/select/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use tracing::warn;

use crate::config::ProjectConfig;
use crate::types::ActionKind;

/// Characters that turn a pattern into a wildcard pattern.
const WILDCARD_CHARS: &[char] = &['*', '?', '[', '{'];

/// A single include/exclude rule, relative to the project directory.
///
/// - *Wildcard* patterns are glob-matched against the whole relative path.
///   `*` and `?` never cross a `/`; `**` spans any number of components.
/// - *Literal* patterns match the path itself or anything below it
///   (`node_modules` covers `node_modules/x/y.ts`).
#[derive(Clone)]
pub struct Pattern {
    raw: String,
    normalized: String,
    matcher: Option<GlobMatcher>,
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("raw", &self.raw)
            .field("wildcard", &self.is_wildcard())
            .finish()
    }
}

impl Pattern {
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize(raw);
        let matcher = if normalized.contains(WILDCARD_CHARS) {
            let glob = GlobBuilder::new(&normalized)
                .literal_separator(true)
                .build()
                .with_context(|| format!("invalid glob pattern: {raw}"))?;
            Some(glob.compile_matcher())
        } else {
            None
        };

        Ok(Self {
            raw: raw.to_string(),
            normalized,
            matcher,
        })
    }

    /// The pattern as written in the configuration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_wildcard(&self) -> bool {
        self.matcher.is_some()
    }

    /// Test a `/`-separated path relative to the project directory.
    pub fn matches(&self, rel_path: &str) -> bool {
        match &self.matcher {
            Some(glob) => glob.is_match(rel_path),
            None => covers(&self.normalized, rel_path),
        }
    }

    /// True when this is a literal pattern covering the directory `rel_dir`,
    /// i.e. every file below it would match.
    pub fn covers_dir(&self, rel_dir: &str) -> bool {
        self.matcher.is_none() && covers(&self.normalized, rel_dir)
    }

    /// The literal leading segments, up to (not including) the first segment
    /// containing a wildcard. Empty means the project directory itself.
    ///
    /// `src/**/*.ts` -> `src`, `**/*.ts` -> ``, `src/index.ts` -> `src/index.ts`.
    pub fn base_dir(&self) -> String {
        self.normalized
            .split('/')
            .take_while(|seg| !seg.contains(WILDCARD_CHARS))
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Strip `./` prefixes and trailing `/` so `./src/` and `src` are the same rule.
fn normalize(raw: &str) -> String {
    let mut s = raw.trim();
    while let Some(rest) = s.strip_prefix("./") {
        s = rest;
    }
    let s = s.trim_end_matches('/');
    if s == "." { String::new() } else { s.to_string() }
}

fn covers(literal: &str, rel_path: &str) -> bool {
    if literal.is_empty() {
        return true;
    }
    rel_path == literal
        || rel_path
            .strip_prefix(literal)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Compiled include/exclude rules for one selection pass.
///
/// Include order is preserved (it decides [`FileSet`](super::FileSet) order);
/// exclusion is a plain membership test.
#[derive(Debug, Clone, Default)]
pub struct SelectionRules {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl SelectionRules {
    /// Compile the given lists. Patterns that fail to compile are skipped
    /// with a warning.
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            include: compile_all(include),
            exclude: compile_all(exclude),
        }
    }

    /// Rules for `action`: the configured (or per-action default) lists plus
    /// the action's implicit exclusions.
    pub fn for_action(config: &ProjectConfig, action: ActionKind) -> Self {
        let include = config.include_for(action);
        let mut exclude = config.exclude_for(action);
        for implicit in action.implicit_exclude() {
            if !exclude.iter().any(|e| e == implicit) {
                exclude.push(implicit.to_string());
            }
        }
        Self::new(include, exclude)
    }

    pub fn include(&self) -> &[Pattern] {
        &self.include
    }

    pub fn exclude(&self) -> &[Pattern] {
        &self.exclude
    }

    pub fn is_included(&self, rel_path: &str) -> bool {
        self.include.iter().any(|p| p.matches(rel_path))
    }

    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(rel_path))
    }

    /// Include match and no exclude match.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.is_included(rel_path) && !self.is_excluded(rel_path)
    }

    /// A directory whose whole subtree is excluded by a literal rule; walking
    /// into it cannot contribute any file.
    pub fn prunes_dir(&self, rel_dir: &str) -> bool {
        self.exclude.iter().any(|p| p.covers_dir(rel_dir))
    }
}

fn compile_all<I>(patterns: I) -> Vec<Pattern>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    patterns
        .into_iter()
        .filter_map(|p| match Pattern::parse(p.as_ref()) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                warn!("skipping pattern: {err:#}");
                None
            }
        })
        .collect()
}
