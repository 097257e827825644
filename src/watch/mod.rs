// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Deriving the directories to subscribe to from the include patterns.
//! - Wiring up a cross-platform filesystem watcher (`notify`) per root.
//! - Filtering changed paths with the same rules used for file selection.
//! - Running the session ([`WatchCoordinator`]) and stopping it
//!   ([`ShutdownHandle`]).
//!
//! The coalescing semantics live in [`crate::engine`]; this module only turns
//! filesystem changes into `WatchEvent`s.

pub mod coordinator;
pub mod event_handler;
pub mod roots;
pub mod watcher;

pub use coordinator::{ShutdownHandle, WatchCoordinator};
pub use roots::derive_watch_roots;
pub use watcher::{WatcherSet, spawn_watchers};
