// src/engine/runtime.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::errors::Result;
use crate::exec::RebuildAction;

use super::announce::ChangeAnnouncer;
use super::core::CoreRuntime;
use super::{CoreCommand, RebuildOutcome, TriggerReason, WatchEvent};

/// Drives the rebuild state machine in response to `WatchEvent`s and
/// delegates the actual work to a `RebuildAction`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// coalescing semantics. Each rebuild runs on its own task and reports back
/// through the same event channel, so the loop keeps draining change events
/// while a rebuild is in flight.
pub struct Runtime {
    core: CoreRuntime,
    event_rx: mpsc::UnboundedReceiver<WatchEvent>,
    event_tx: mpsc::UnboundedSender<WatchEvent>,
    action: Arc<dyn RebuildAction>,
    announcer: Option<ChangeAnnouncer>,
    /// Latest change that arrived while a rebuild was running.
    queued_change: Option<PathBuf>,
    rebuilds_started: u64,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("announcer", &self.announcer)
            .field("rebuilds_started", &self.rebuilds_started)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// `event_tx` must feed `event_rx`; rebuild tasks use it to report
    /// completion.
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::UnboundedReceiver<WatchEvent>,
        event_tx: mpsc::UnboundedSender<WatchEvent>,
        action: Arc<dyn RebuildAction>,
    ) -> Self {
        Self {
            core,
            event_rx,
            event_tx,
            action,
            announcer: None,
            queued_change: None,
            rebuilds_started: 0,
        }
    }

    /// Announce the triggering file before every change-driven rebuild.
    pub fn with_announcer(mut self, announcer: ChangeAnnouncer) -> Self {
        self.announcer = Some(announcer);
        self
    }

    /// Main event loop.
    ///
    /// - Dispatches the initial rebuild.
    /// - Consumes `WatchEvent`s from `event_rx` and feeds them to the core.
    /// - Executes the commands returned by the core.
    ///
    /// Returns once the core asks to stop, i.e. after a `ShutdownRequested`.
    /// A rebuild still running at that point is left to finish on its own;
    /// its result is discarded.
    pub async fn run(mut self) -> Result<()> {
        info!("watch runtime started");

        let step = self.core.start();
        for command in step.commands {
            self.execute_command(command, None);
        }

        // `self.event_tx` keeps the channel open, so `recv` only yields
        // events; the loop ends when the core says so.
        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "runtime received event");

            let changed = match &event {
                WatchEvent::ChangeDetected { path } => Some(path.clone()),
                _ => None,
            };

            let step = self.core.step(event);

            if step.commands.is_empty() && step.keep_running && changed.is_some() {
                self.queued_change = changed.clone();
            }

            for command in step.commands {
                self.execute_command(command, changed.as_deref());
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!(rebuilds = self.rebuilds_started, "watch runtime exiting");
        Ok(())
    }

    fn execute_command(&mut self, command: CoreCommand, changed: Option<&Path>) {
        match command {
            CoreCommand::StartRebuild { reason } => {
                let trigger = match reason {
                    TriggerReason::Startup => None,
                    TriggerReason::FileChange => changed.map(Path::to_path_buf),
                    TriggerReason::Pending => self.queued_change.take(),
                };
                if let (Some(announcer), Some(path)) = (self.announcer.as_mut(), trigger) {
                    announcer.announce(&path);
                }
                self.spawn_rebuild(reason);
            }
        }
    }

    /// Run one rebuild on its own task, supervised so that `RebuildFinished`
    /// is reported even when the action panics.
    fn spawn_rebuild(&mut self, reason: TriggerReason) {
        self.rebuilds_started += 1;
        let id = self.rebuilds_started;
        let action = Arc::clone(&self.action);
        let tx = self.event_tx.clone();

        info!(rebuild = id, ?reason, "rebuilding");

        tokio::spawn(async move {
            let started = Instant::now();
            let task = tokio::spawn(async move { action.rebuild().await });

            let outcome = match task.await {
                Ok(Ok(result)) if result.success => {
                    info!(
                        rebuild = id,
                        artifacts = result.artifacts.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "rebuild succeeded"
                    );
                    RebuildOutcome::Success
                }
                Ok(Ok(result)) => {
                    for diag in &result.diagnostics {
                        warn!("{diag}");
                    }
                    warn!(
                        rebuild = id,
                        diagnostics = result.diagnostics.len(),
                        "rebuild failed"
                    );
                    RebuildOutcome::Failed
                }
                Ok(Err(err)) => {
                    error!(rebuild = id, "rebuild error: {err}");
                    RebuildOutcome::Failed
                }
                Err(join_err) if join_err.is_panic() => {
                    error!(rebuild = id, "rebuild panicked");
                    RebuildOutcome::Failed
                }
                Err(join_err) => {
                    error!(rebuild = id, "rebuild task cancelled: {join_err}");
                    RebuildOutcome::Failed
                }
            };

            if tx.send(WatchEvent::RebuildFinished { outcome }).is_err() {
                debug!(rebuild = id, "runtime gone; rebuild result dropped");
            }
        });
    }
}
