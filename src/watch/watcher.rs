// src/watch/watcher.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::WatchEvent;
use crate::select::SelectionRules;
use crate::watch::event_handler::{is_relevant_kind, process_path_change};

/// The live filesystem subscriptions of one watch session.
///
/// Holds one `RecommendedWatcher` per root. Dropping the set releases every
/// subscription; once the last one is gone the forwarding task ends too.
pub struct WatcherSet {
    _watchers: Vec<RecommendedWatcher>,
    roots: Vec<PathBuf>,
}

impl std::fmt::Debug for WatcherSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherSet")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl WatcherSet {
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Subscribe to every root recursively and forward relevant changes to the
/// runtime as `WatchEvent::ChangeDetected`.
///
/// - `project_dir` is the directory selection patterns are relative to.
/// - `roots` are the directories to watch (see
///   [`derive_watch_roots`](super::derive_watch_roots)).
/// - `rules` filters changed paths before they reach the runtime.
pub fn spawn_watchers(
    project_dir: impl Into<PathBuf>,
    roots: Vec<PathBuf>,
    rules: SelectionRules,
    runtime_tx: mpsc::UnboundedSender<WatchEvent>,
) -> Result<WatcherSet> {
    let project_dir = project_dir.into();

    // Channel from the blocking notify callbacks into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watchers = Vec::with_capacity(roots.len());
    for root in &roots {
        let mut watcher = RecommendedWatcher::new(
            {
                let event_tx = event_tx.clone();
                move |res: notify::Result<Event>| match res {
                    Ok(event) => {
                        // Fails only once the forwarding task is gone.
                        let _ = event_tx.send(event);
                    }
                    Err(err) => {
                        eprintln!("tsgate: file watch error: {err}");
                    }
                }
            },
            Config::default(),
        )?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("watching {}", root.display()))?;
        info!("file watcher started on {:?}", root);
        watchers.push(watcher);
    }
    drop(event_tx);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");

            if !is_relevant_kind(&event.kind) {
                continue;
            }
            for path in &event.paths {
                if !process_path_change(&project_dir, path, &rules, &runtime_tx) {
                    debug!("runtime closed; watcher forwarding stopped");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherSet {
        _watchers: watchers,
        roots,
    })
}
