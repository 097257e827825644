// src/engine/mod.rs

//! Rebuild coalescing engine for watch sessions.
//!
//! This module ties together:
//! - filesystem change notifications (already filtered by the selection
//!   rules)
//! - rebuild completions
//! - shutdown requests
//!
//! and guarantees at most one rebuild in flight plus at most one queued
//! follow-up, however many changes arrive.
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`], and [`announce`] prints the change that
//! triggered each rebuild.

use std::path::PathBuf;

/// Outcome of one rebuild, as far as the engine cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    Success,
    /// The action returned a failed result or an error. Either way the
    /// session keeps watching.
    Failed,
}

/// Why a rebuild was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// The unconditional rebuild at session start.
    Startup,
    /// A relevant file changed.
    FileChange,
    /// Changes arrived while the previous rebuild was running.
    Pending,
}

/// Events flowing into the runtime from the watcher, rebuild tasks and the
/// shutdown handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A file matching the selection rules was created, modified, removed
    /// or renamed.
    ChangeDetected { path: PathBuf },
    /// The in-flight rebuild completed.
    RebuildFinished { outcome: RebuildOutcome },
    /// Stop the session (Ctrl-C or an explicit stop).
    ShutdownRequested,
}

pub mod announce;
pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use announce::ChangeAnnouncer;
pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
