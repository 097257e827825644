// src/actions/watch.rs

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use crate::actions::build::{BuildAction, BuildSettings};
use crate::actions::ActionContext;
use crate::errors::Result;
use crate::exec::Bundler;
use crate::types::ActionKind;
use crate::watch::WatchCoordinator;

/// Whether to keep earlier output on screen: the CLI flag, or the project's
/// `compilerOptions.preserveWatchOutput`.
pub fn preserve_watch_output(ctx: &ActionContext, flag: bool) -> bool {
    flag || ctx
        .compiler_options()
        .extra
        .get("preserveWatchOutput")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Watch the sources selected for `watch` and rebuild on every relevant
/// change until Ctrl-C. Each change-driven rebuild is announced on stdout,
/// clearing the screen first unless `preserve_output`.
///
/// The bundler is located up front so a missing tool fails the command
/// before any watching starts.
pub async fn run_watch(
    ctx: &ActionContext,
    bundler: Arc<dyn Bundler>,
    settings: BuildSettings,
    preserve_output: bool,
) -> Result<()> {
    bundler.ensure_available().await?;

    let rules = ctx.rules(ActionKind::Watch);
    let action = Arc::new(BuildAction::new(ctx.clone(), bundler, settings));
    let coordinator = WatchCoordinator::new(Arc::clone(&ctx.fs), ctx.cwd.clone(), rules, action)
        .announce_changes(preserve_output);

    // Ctrl-C → graceful shutdown.
    {
        let handle = coordinator.shutdown_handle();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for Ctrl+C: {e}");
                return;
            }
            handle.stop();
        });
    }

    println!("Watching for changes... (Ctrl-C to stop)");
    info!(cwd = %ctx.cwd.display(), "watch session starting");
    coordinator.run().await?;
    println!("Stopped watching");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use std::path::Path;

    fn context(tsconfig: &str) -> ActionContext {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/tsconfig.json", tsconfig);
        ActionContext::load(Arc::new(fs), "/proj", Path::new("tsconfig.json"), None)
    }

    #[test]
    fn preserve_output_comes_from_flag_or_project() {
        let plain = context(r#"{ "compilerOptions": {} }"#);
        assert!(!preserve_watch_output(&plain, false));
        assert!(preserve_watch_output(&plain, true));

        let preserving = context(r#"{ "compilerOptions": { "preserveWatchOutput": true } }"#);
        assert!(preserve_watch_output(&preserving, false));
    }
}
