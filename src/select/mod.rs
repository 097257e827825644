// src/select/mod.rs

//! File selection: turning include/exclude patterns into a [`FileSet`].
//!
//! - [`patterns`] compiles configuration strings into [`Pattern`]s and
//!   groups them as [`SelectionRules`] (shared with the watcher's event
//!   filter).
//! - [`selector`] walks the project tree and builds the ordered,
//!   deduplicated result.

pub mod path_utils;
pub mod patterns;
pub mod selector;

pub use patterns::{Pattern, SelectionRules};
pub use selector::{FileSelector, FileSet};
