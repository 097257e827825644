// src/watch/event_handler.rs

//! Event processing logic for file system changes.

use std::path::Path;

use notify::EventKind;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::engine::WatchEvent;
use crate::select::SelectionRules;
use crate::select::path_utils::relative_str;

/// Whether a notify event kind can change what a rebuild would produce.
/// Pure reads (`Access`) are ignored.
pub fn is_relevant_kind(kind: &EventKind) -> bool {
    !matches!(kind, EventKind::Access(_))
}

/// Forward one changed path to the runtime if the selection rules accept it.
///
/// Paths outside `root`, paths no include pattern matches and excluded paths
/// are dropped here and never reach the core.
///
/// Returns `false` once the runtime side of the channel is gone.
pub fn process_path_change(
    root: &Path,
    path: &Path,
    rules: &SelectionRules,
    runtime_tx: &mpsc::UnboundedSender<WatchEvent>,
) -> bool {
    let Some(rel_str) = relative_str(root, path) else {
        debug!(?path, "change outside the project directory; ignored");
        return true;
    };

    if !rules.matches(&rel_str) {
        trace!(rel = %rel_str, "change does not match selection rules");
        return true;
    }

    debug!(rel = %rel_str, "relevant change");
    runtime_tx
        .send(WatchEvent::ChangeDetected {
            path: path.to_path_buf(),
        })
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind};

    fn rules() -> SelectionRules {
        SelectionRules::new(["src/**/*.ts"], ["**/*.test.ts", "**/*.d.ts"])
    }

    #[test]
    fn only_matching_paths_are_forwarded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let root = Path::new("/proj");

        assert!(process_path_change(root, Path::new("/proj/src/a.ts"), &rules(), &tx));
        assert!(process_path_change(root, Path::new("/proj/src/a.test.ts"), &rules(), &tx));
        assert!(process_path_change(root, Path::new("/proj/src/a.d.ts"), &rules(), &tx));
        assert!(process_path_change(root, Path::new("/proj/README.md"), &rules(), &tx));
        assert!(process_path_change(root, Path::new("/elsewhere/src/a.ts"), &rules(), &tx));

        assert_eq!(
            rx.try_recv().ok(),
            Some(WatchEvent::ChangeDetected {
                path: "/proj/src/a.ts".into()
            })
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_runtime_is_reported() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        assert!(!process_path_change(
            Path::new("/proj"),
            Path::new("/proj/src/a.ts"),
            &rules(),
            &tx
        ));
    }

    #[test]
    fn access_events_are_not_relevant() {
        assert!(!is_relevant_kind(&EventKind::Access(AccessKind::Any)));
        assert!(is_relevant_kind(&EventKind::Create(CreateKind::File)));
        assert!(is_relevant_kind(&EventKind::Any));
    }
}
