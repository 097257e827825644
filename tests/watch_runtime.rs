// tests/watch_runtime.rs

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};

use tsgate::engine::announce::CLEAR_SCREEN;
use tsgate::engine::{ChangeAnnouncer, CoreRuntime, Runtime, WatchEvent};
use tsgate::errors::Result as TsgateResult;
use tsgate_test_utils::fakes::{ControllableRebuild, SharedBuffer};
use tsgate_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

struct Session {
    tx: mpsc::UnboundedSender<WatchEvent>,
    handle: JoinHandle<TsgateResult<()>>,
}

fn start(action: Arc<ControllableRebuild>) -> Session {
    start_with(action, None)
}

fn start_with(action: Arc<ControllableRebuild>, announcer: Option<ChangeAnnouncer>) -> Session {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut runtime = Runtime::new(CoreRuntime::new(), rx, tx.clone(), action);
    if let Some(announcer) = announcer {
        runtime = runtime.with_announcer(announcer);
    }
    Session {
        tx,
        handle: tokio::spawn(runtime.run()),
    }
}

fn change(path: &str) -> WatchEvent {
    WatchEvent::ChangeDetected {
        path: PathBuf::from(path),
    }
}

#[tokio::test]
async fn burst_during_rebuild_coalesces_into_one_follow_up() -> TestResult {
    with_timeout(async {
        init_tracing();
        let (action, mut started) = ControllableRebuild::gated();
        let session = start(action.clone());

        // Initial rebuild.
        assert_eq!(started.recv().await, Some(1));

        for i in 0..5 {
            session.tx.send(change(&format!("/proj/src/f{i}.ts")))?;
        }
        action.release(1);

        // Exactly one follow-up for the whole burst.
        assert_eq!(started.recv().await, Some(2));
        action.release(1);
        sleep(Duration::from_millis(100)).await;

        assert_eq!(action.calls(), 2);
        assert_eq!(action.max_in_flight(), 1);

        session.tx.send(WatchEvent::ShutdownRequested)?;
        session.handle.await??;
        Ok(())
    })
    .await
}

#[tokio::test]
async fn change_while_idle_starts_a_rebuild() -> TestResult {
    with_timeout(async {
        init_tracing();
        let (action, mut started) = ControllableRebuild::ungated();
        let session = start(action.clone());

        assert_eq!(started.recv().await, Some(1));
        // Let the initial rebuild report back before the next change.
        sleep(Duration::from_millis(50)).await;

        session.tx.send(change("/proj/src/a.ts"))?;
        assert_eq!(started.recv().await, Some(2));

        session.tx.send(WatchEvent::ShutdownRequested)?;
        session.handle.await??;
        assert_eq!(action.max_in_flight(), 1);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn failed_rebuild_keeps_the_session_alive() -> TestResult {
    with_timeout(async {
        init_tracing();
        let (action, mut started) = ControllableRebuild::gated();
        action.fail_call(1);
        let session = start(action.clone());

        assert_eq!(started.recv().await, Some(1));
        action.release(1);
        sleep(Duration::from_millis(50)).await;
        assert!(!session.handle.is_finished());

        session.tx.send(change("/proj/src/a.ts"))?;
        assert_eq!(started.recv().await, Some(2));
        action.release(1);

        session.tx.send(WatchEvent::ShutdownRequested)?;
        session.handle.await??;
        Ok(())
    })
    .await
}

#[tokio::test]
async fn shutdown_during_rebuild_drops_the_pending_one() -> TestResult {
    with_timeout(async {
        init_tracing();
        let (action, mut started) = ControllableRebuild::gated();
        let session = start(action.clone());

        assert_eq!(started.recv().await, Some(1));
        session.tx.send(change("/proj/src/a.ts"))?;
        session.tx.send(WatchEvent::ShutdownRequested)?;

        // The runtime exits without waiting for the in-flight rebuild.
        session.handle.await??;

        action.release(2);
        sleep(Duration::from_millis(50)).await;
        assert_eq!(action.calls(), 1);
        assert!(started.try_recv().is_err());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn panicking_rebuild_does_not_wedge_the_session() -> TestResult {
    with_timeout(async {
        init_tracing();
        let (action, mut started) = ControllableRebuild::ungated();
        action.panic_call(1);
        let session = start(action.clone());

        assert_eq!(started.recv().await, Some(1));
        sleep(Duration::from_millis(50)).await;
        assert!(!session.handle.is_finished());

        // The panic counts as a failed rebuild, so the session is idle again.
        session.tx.send(change("/proj/src/a.ts"))?;
        assert_eq!(started.recv().await, Some(2));

        session.tx.send(WatchEvent::ShutdownRequested)?;
        session.handle.await??;
        assert_eq!(action.calls(), 2);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn change_driven_rebuilds_announce_the_relative_path() -> TestResult {
    with_timeout(async {
        init_tracing();
        let out = SharedBuffer::new();
        let (action, mut started) = ControllableRebuild::gated();
        let announcer = ChangeAnnouncer::new("/proj", true, Box::new(out.clone()));
        let session = start_with(action.clone(), Some(announcer));

        // The initial rebuild has no triggering file.
        assert_eq!(started.recv().await, Some(1));
        assert_eq!(out.text(), "");

        // Queued changes: the follow-up names the latest one.
        session.tx.send(change("/proj/src/a.ts"))?;
        session.tx.send(change("/proj/src/b.ts"))?;
        action.release(1);
        assert_eq!(started.recv().await, Some(2));
        action.release(1);
        sleep(Duration::from_millis(50)).await;

        session.tx.send(change("/proj/lib/c.ts"))?;
        assert_eq!(started.recv().await, Some(3));
        action.release(1);

        session.tx.send(WatchEvent::ShutdownRequested)?;
        session.handle.await??;

        assert_eq!(
            out.text(),
            format!(
                "{CLEAR_SCREEN}File changed: src/b.ts\n{CLEAR_SCREEN}File changed: lib/c.ts\n"
            )
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn preserved_output_is_not_cleared() -> TestResult {
    with_timeout(async {
        init_tracing();
        let out = SharedBuffer::new();
        let (action, mut started) = ControllableRebuild::ungated();
        let announcer = ChangeAnnouncer::new("/proj", false, Box::new(out.clone()));
        let session = start_with(action.clone(), Some(announcer));

        assert_eq!(started.recv().await, Some(1));
        sleep(Duration::from_millis(50)).await;
        session.tx.send(change("/proj/src/a.ts"))?;
        assert_eq!(started.recv().await, Some(2));

        session.tx.send(WatchEvent::ShutdownRequested)?;
        session.handle.await??;
        assert_eq!(out.text(), "File changed: src/a.ts\n");
        Ok(())
    })
    .await
}
