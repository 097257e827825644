// src/watch/coordinator.rs

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::info;

use crate::engine::{ChangeAnnouncer, CoreRuntime, Runtime, WatchEvent};
use crate::errors::Result;
use crate::exec::RebuildAction;
use crate::fs::FileSystem;
use crate::select::SelectionRules;
use crate::watch::roots::derive_watch_roots;
use crate::watch::watcher::{WatcherSet, spawn_watchers};

/// One watch session: subscriptions, event filter and rebuild runtime.
///
/// `run` dispatches an initial rebuild, then rebuilds on every relevant
/// change with at most one rebuild in flight and one queued behind it.
pub struct WatchCoordinator {
    fs: Arc<dyn FileSystem>,
    cwd: PathBuf,
    rules: SelectionRules,
    action: Arc<dyn RebuildAction>,
    announcer: Option<ChangeAnnouncer>,
    event_tx: mpsc::UnboundedSender<WatchEvent>,
    event_rx: mpsc::UnboundedReceiver<WatchEvent>,
    shutdown: ShutdownHandle,
}

impl std::fmt::Debug for WatchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchCoordinator")
            .field("cwd", &self.cwd)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl WatchCoordinator {
    /// `rules` decide both the watch roots and which changes count.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cwd: impl Into<PathBuf>,
        rules: SelectionRules,
        action: Arc<dyn RebuildAction>,
    ) -> Self {
        let cwd = cwd.into();
        let cwd = fs.canonicalize(&cwd).unwrap_or(cwd);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let shutdown = ShutdownHandle::new(event_tx.clone());
        Self {
            fs,
            cwd,
            rules,
            action,
            announcer: None,
            event_tx,
            event_rx,
            shutdown,
        }
    }

    /// Print `File changed: <path>` on stdout before each change-driven
    /// rebuild, clearing the screen first unless `preserve_output`.
    pub fn announce_changes(self, preserve_output: bool) -> Self {
        let announcer = ChangeAnnouncer::stdout(self.cwd.clone(), preserve_output);
        self.with_announcer(announcer)
    }

    pub fn with_announcer(mut self, announcer: ChangeAnnouncer) -> Self {
        self.announcer = Some(announcer);
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Handle that stops this session from anywhere (signal handlers,
    /// tests). Valid before, during and after `run`.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Sender into the session's event channel. Events sent here go through
    /// the same core as filesystem notifications, without the path filter.
    pub fn event_sender(&self) -> mpsc::UnboundedSender<WatchEvent> {
        self.event_tx.clone()
    }

    /// Run until stopped.
    pub async fn run(self) -> Result<()> {
        if self.shutdown.is_stopped() {
            info!("watch session stopped before start");
            return Ok(());
        }

        let roots = derive_watch_roots(self.fs.as_ref(), &self.cwd, &self.rules);
        if roots.is_empty() {
            info!("no watch roots exist; only the initial rebuild will run");
        }

        let watchers = spawn_watchers(
            self.cwd.clone(),
            roots,
            self.rules.clone(),
            self.event_tx.clone(),
        )?;
        self.shutdown.install(watchers);

        let mut runtime =
            Runtime::new(CoreRuntime::new(), self.event_rx, self.event_tx, self.action);
        if let Some(announcer) = self.announcer {
            runtime = runtime.with_announcer(announcer);
        }

        // The runtime only returns after a `ShutdownRequested`. One sent
        // through `event_sender` bypasses `stop`, so release the watchers
        // here; after an explicit stop this does nothing.
        let result = runtime.run().await;
        self.shutdown.stop();
        result
    }
}

/// Stops a watch session. Cheap to clone; `stop` is idempotent.
#[derive(Clone)]
pub struct ShutdownHandle {
    inner: Arc<ShutdownInner>,
}

struct ShutdownInner {
    stopped: AtomicBool,
    watchers: Mutex<Option<WatcherSet>>,
    event_tx: mpsc::UnboundedSender<WatchEvent>,
}

impl std::fmt::Debug for ShutdownHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownHandle")
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

impl ShutdownHandle {
    fn new(event_tx: mpsc::UnboundedSender<WatchEvent>) -> Self {
        Self {
            inner: Arc::new(ShutdownInner {
                stopped: AtomicBool::new(false),
                watchers: Mutex::new(None),
                event_tx,
            }),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Release every watch subscription and ask the runtime to exit. A
    /// rebuild already running is not interrupted. Later calls do nothing.
    pub fn stop(&self) {
        if self.inner.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("stopping watch session");
        drop(self.take_watchers());
        // The runtime may already be gone.
        let _ = self.inner.event_tx.send(WatchEvent::ShutdownRequested);
    }

    /// Keep `watchers` alive until `stop`; dropped at once if already stopped.
    fn install(&self, watchers: WatcherSet) {
        let mut slot = self
            .inner
            .watchers
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        if self.is_stopped() {
            drop(slot);
            drop(watchers);
            return;
        }
        *slot = Some(watchers);
    }

    fn take_watchers(&self) -> Option<WatcherSet> {
        self.inner
            .watchers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
    }
}
