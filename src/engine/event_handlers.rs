// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::path::Path;

use tracing::debug;

use crate::engine::{RebuildOutcome, TriggerReason};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    /// Dispatch one rebuild.
    StartRebuild { reason: TriggerReason },
}

/// Decision returned by the core after handling a single `WatchEvent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn idle() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }

    pub(crate) fn rebuild(reason: TriggerReason) -> Self {
        Self {
            commands: vec![CoreCommand::StartRebuild { reason }],
            keep_running: true,
        }
    }

    pub(crate) fn exit() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: false,
        }
    }
}

/// Session flags. `building` and `pending_rebuild` together encode the
/// Idle / Building / Building+Pending states; `pending_rebuild` is never set
/// while idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    pub building: bool,
    pub pending_rebuild: bool,
    pub stopped: bool,
}

/// A relevant change arrived.
///
/// - Idle: start building right away.
/// - Building: remember that another rebuild is needed; any number of
///   changes collapse into that single follow-up.
pub fn handle_change(state: &mut SessionState, path: &Path) -> CoreStep {
    if state.stopped {
        return CoreStep::exit();
    }

    if state.building {
        if !state.pending_rebuild {
            debug!(path = %path.display(), "change during rebuild; queued follow-up");
        }
        state.pending_rebuild = true;
        return CoreStep::idle();
    }

    debug!(path = %path.display(), "change while idle; rebuilding");
    state.building = true;
    CoreStep::rebuild(TriggerReason::FileChange)
}

/// The in-flight rebuild completed (successfully or not).
///
/// If changes were queued meanwhile, exactly one follow-up rebuild starts;
/// otherwise the session goes idle.
pub fn handle_rebuild_finished(state: &mut SessionState, outcome: RebuildOutcome) -> CoreStep {
    if state.stopped {
        return CoreStep::exit();
    }

    if !state.building {
        debug!(?outcome, "rebuild completion while idle; ignored");
        return CoreStep::idle();
    }

    if state.pending_rebuild {
        state.pending_rebuild = false;
        return CoreStep::rebuild(TriggerReason::Pending);
    }

    state.building = false;
    CoreStep::idle()
}

/// Shutdown was requested. Nothing is dispatched afterwards.
pub fn handle_shutdown(state: &mut SessionState) -> CoreStep {
    state.stopped = true;
    state.pending_rebuild = false;
    CoreStep::exit()
}
