// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`WatchEvent`]s and produces:
//! - an updated session state
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for reading
//! events from channels, running rebuilds and reporting their completion.
//!
//! The core is unit tested without any Tokio, channels, filesystem, or
//! processes.

use crate::engine::event_handlers::{
    CoreStep, SessionState, handle_change, handle_rebuild_finished, handle_shutdown,
};
use crate::engine::{TriggerReason, WatchEvent};

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug, Default)]
pub struct CoreRuntime {
    state: SessionState,
}

impl CoreRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the session flags (for tests and logging).
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_building(&self) -> bool {
        self.state.building
    }

    pub fn is_stopped(&self) -> bool {
        self.state.stopped
    }

    /// The unconditional initial rebuild. Calling it again while a rebuild
    /// is in flight (or after stop) does nothing.
    pub fn start(&mut self) -> CoreStep {
        if self.state.stopped {
            return CoreStep::exit();
        }
        if self.state.building {
            return CoreStep::idle();
        }
        self.state.building = true;
        CoreStep::rebuild(TriggerReason::Startup)
    }

    /// Handle a single event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: WatchEvent) -> CoreStep {
        match event {
            WatchEvent::ChangeDetected { path } => handle_change(&mut self.state, &path),
            WatchEvent::RebuildFinished { outcome } => {
                handle_rebuild_finished(&mut self.state, outcome)
            }
            WatchEvent::ShutdownRequested => handle_shutdown(&mut self.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::engine::{CoreCommand, RebuildOutcome};

    fn change(p: &str) -> WatchEvent {
        WatchEvent::ChangeDetected {
            path: PathBuf::from(p),
        }
    }

    fn finished(outcome: RebuildOutcome) -> WatchEvent {
        WatchEvent::RebuildFinished { outcome }
    }

    fn rebuilds(step: &CoreStep) -> usize {
        step.commands
            .iter()
            .filter(|c| matches!(c, CoreCommand::StartRebuild { .. }))
            .count()
    }

    #[test]
    fn start_dispatches_exactly_one_rebuild() {
        let mut core = CoreRuntime::new();
        let step = core.start();
        assert_eq!(
            step.commands,
            vec![CoreCommand::StartRebuild {
                reason: TriggerReason::Startup
            }]
        );
        assert!(core.is_building());
        assert_eq!(rebuilds(&core.start()), 0);
    }

    #[test]
    fn burst_during_rebuild_collapses_into_one_follow_up() {
        let mut core = CoreRuntime::new();
        core.start();
        core.step(finished(RebuildOutcome::Success));
        assert!(!core.is_building());

        let mut total = rebuilds(&core.step(change("src/a.ts")));
        for p in ["src/a.ts", "src/b.ts", "src/c.ts", "src/a.ts"] {
            total += rebuilds(&core.step(change(p)));
        }
        assert_eq!(total, 1);
        assert!(core.state().pending_rebuild);

        let step = core.step(finished(RebuildOutcome::Success));
        assert_eq!(
            step.commands,
            vec![CoreCommand::StartRebuild {
                reason: TriggerReason::Pending
            }]
        );
        assert!(!core.state().pending_rebuild);

        assert_eq!(rebuilds(&core.step(finished(RebuildOutcome::Success))), 0);
        assert!(!core.is_building());
    }

    #[test]
    fn failed_rebuild_keeps_session_alive() {
        let mut core = CoreRuntime::new();
        core.start();
        let step = core.step(finished(RebuildOutcome::Failed));
        assert!(step.keep_running);
        assert!(!core.is_building());

        assert_eq!(rebuilds(&core.step(change("src/a.ts"))), 1);
    }

    #[test]
    fn stray_completion_while_idle_is_ignored() {
        let mut core = CoreRuntime::new();
        let step = core.step(finished(RebuildOutcome::Success));
        assert_eq!(step, CoreStep::idle());
        assert_eq!(core.state(), SessionState::default());
    }

    #[test]
    fn nothing_is_dispatched_after_shutdown() {
        let mut core = CoreRuntime::new();
        core.start();
        core.step(change("src/a.ts"));

        let step = core.step(WatchEvent::ShutdownRequested);
        assert!(!step.keep_running);
        assert!(core.is_stopped());

        assert_eq!(rebuilds(&core.step(finished(RebuildOutcome::Success))), 0);
        assert_eq!(rebuilds(&core.step(change("src/b.ts"))), 0);
        assert_eq!(rebuilds(&core.start()), 0);

        // a second stop is harmless
        assert!(!core.step(WatchEvent::ShutdownRequested).keep_running);
    }
}
