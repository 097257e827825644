// tests/selection_properties.rs

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;

use proptest::prelude::*;
use tsgate::fs::mock::MockFileSystem;
use tsgate::select::path_utils::relative_str;
use tsgate::select::{FileSelector, SelectionRules};

const ROOT: &str = "/proj";

const DIRS: &[&str] = &["src", "lib", "node_modules", "deep", "dist"];
const NAMES: &[&str] = &["a.ts", "b.tsx", "c.test.ts", "d.d.ts", "e.js"];
const INCLUDES: &[&str] = &[
    "**/*.ts",
    "**/*.tsx",
    "src/**/*.ts",
    "src/*.ts",
    "lib",
    "*.ts",
    "src/deep/a.ts",
];
const EXCLUDES: &[&str] = &["node_modules", "**/*.test.ts", "lib/deep", "*.ts", "dist"];

// Rules the hand-written oracle below understands: literals and
// `**/*<suffix>` globs.
const SIMPLE_INCLUDES: &[&str] = &["src", "lib", "deep", "src/deep/a.ts", "**/*.tsx", "**/*.ts"];
const SIMPLE_EXCLUDES: &[&str] = &["node_modules", "lib/deep", "dist", "src/a.ts", "**/*.d.ts"];

/// Membership written out by hand, independent of `SelectionRules`.
fn rule_covers(rule: &str, rel: &str) -> bool {
    match rule.strip_prefix("**/*") {
        Some(suffix) => rel.ends_with(suffix),
        None => rel == rule || rel.starts_with(&format!("{rule}/")),
    }
}

// Relative file paths: up to three directory segments plus a file name.
// Directory names never carry an extension, so no path is both file and dir.
fn tree_strategy() -> impl Strategy<Value = BTreeSet<String>> {
    let path = (
        proptest::collection::vec(proptest::sample::select(DIRS), 0..=3),
        proptest::sample::select(NAMES),
    )
        .prop_map(|(dirs, name)| {
            let mut parts: Vec<&str> = dirs;
            parts.push(name);
            parts.join("/")
        });
    proptest::collection::btree_set(path, 0..24)
}

fn pick(list: &'static [&'static str]) -> impl Strategy<Value = Vec<&'static str>> {
    proptest::sample::subsequence(list, 0..=list.len())
}

proptest! {
    #[test]
    fn selection_is_exactly_the_matching_files(
        tree in tree_strategy(),
        include in pick(INCLUDES),
        exclude in pick(EXCLUDES),
    ) {
        let fs = MockFileSystem::new();
        fs.add_dir(ROOT);
        for rel in &tree {
            fs.add_file(Path::new(ROOT).join(rel), "export {};");
        }

        let rules = SelectionRules::new(include.iter().copied(), exclude.iter().copied());
        let selected = FileSelector::new(Arc::new(fs), ROOT, rules.clone()).select();

        let rels: Vec<String> = selected
            .iter()
            .map(|p| relative_str(Path::new(ROOT), p).expect("selected path inside root"))
            .collect();

        // No duplicates.
        let unique: HashSet<&String> = rels.iter().collect();
        prop_assert_eq!(unique.len(), rels.len());

        // Nothing excluded, nothing unmatched.
        for rel in &rels {
            prop_assert!(!rules.is_excluded(rel), "excluded file selected: {}", rel);
            prop_assert!(rules.is_included(rel), "unmatched file selected: {}", rel);
        }

        // Every matching file is present. This only exercises the walk;
        // matching itself is checked against a hand-written oracle below.
        let expected: BTreeSet<&String> = tree.iter().filter(|rel| rules.matches(rel)).collect();
        let actual: BTreeSet<&String> = rels.iter().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn selection_agrees_with_hand_written_rule_matching(
        tree in tree_strategy(),
        include in pick(SIMPLE_INCLUDES),
        exclude in pick(SIMPLE_EXCLUDES),
    ) {
        let fs = MockFileSystem::new();
        fs.add_dir(ROOT);
        for rel in &tree {
            fs.add_file(Path::new(ROOT).join(rel), "export {};");
        }

        let rules = SelectionRules::new(include.iter().copied(), exclude.iter().copied());
        let selected = FileSelector::new(Arc::new(fs), ROOT, rules).select();
        let actual: BTreeSet<String> = selected
            .iter()
            .map(|p| relative_str(Path::new(ROOT), p).expect("selected path inside root"))
            .collect();

        let expected: BTreeSet<String> = tree
            .iter()
            .filter(|rel| include.iter().any(|r| rule_covers(r, rel)))
            .filter(|rel| !exclude.iter().any(|r| rule_covers(r, rel)))
            .cloned()
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn selection_does_not_depend_on_insertion_order(
        tree in tree_strategy(),
        include in pick(INCLUDES),
    ) {
        let forward = MockFileSystem::new();
        let backward = MockFileSystem::new();
        forward.add_dir(ROOT);
        backward.add_dir(ROOT);
        for rel in &tree {
            forward.add_file(Path::new(ROOT).join(rel), "");
        }
        for rel in tree.iter().rev() {
            backward.add_file(Path::new(ROOT).join(rel), "");
        }

        let rules = SelectionRules::new(include.iter().copied(), ["node_modules"]);
        let a = FileSelector::new(Arc::new(forward), ROOT, rules.clone()).select();
        let b = FileSelector::new(Arc::new(backward), ROOT, rules).select();
        prop_assert_eq!(a, b);
    }
}
