// src/actions/typecheck.rs

use std::time::Instant;

use tracing::{error, info, warn};

use crate::actions::{ActionContext, ActionOutcome, ActionReport, report};
use crate::config::CompilerOptions;
use crate::errors::Result;
use crate::exec::{SourceFile, TypeAnalyzer};
use crate::types::{ActionKind, Diagnostic};

/// Compiler options handed to the analyzer: the project's options, with the
/// tool config's `typecheck.strict` filling in an unset `strict`.
pub fn analyzer_options(ctx: &ActionContext) -> CompilerOptions {
    let mut options = ctx.compiler_options();
    if options.strict.is_none() {
        options.strict = Some(ctx.tool.typecheck.strict);
    }
    options
}

/// Type-check every file selected for `typecheck`.
///
/// Any error-severity diagnostic fails the action; warnings alone do not.
pub async fn run_typecheck(ctx: &ActionContext, analyzer: &dyn TypeAnalyzer) -> Result<ActionReport> {
    let started = Instant::now();
    let files = ctx.select(ActionKind::Typecheck);
    if files.is_empty() {
        return Ok(ActionReport::nothing_to_do(ActionKind::Typecheck, started.elapsed()));
    }

    info!(files = files.len(), "type checking TypeScript files");

    let mut diagnostics = Vec::new();
    let mut sources = Vec::with_capacity(files.len());
    for path in &files {
        match ctx.fs.read_to_string(path) {
            Ok(text) => sources.push(SourceFile {
                path: path.clone(),
                text,
            }),
            Err(err) => {
                warn!("cannot read {}: {err:#}", path.display());
                diagnostics.push(Diagnostic {
                    file: Some(path.clone()),
                    ..Diagnostic::message("read", format!("cannot read file: {err}"))
                });
            }
        }
    }

    if !sources.is_empty() {
        diagnostics.extend(analyzer.analyze(sources).await?);
    }

    let outcome = if diagnostics.iter().any(Diagnostic::is_error) {
        ActionOutcome::Failed
    } else {
        ActionOutcome::Succeeded
    };
    let mut report = ActionReport::new(ActionKind::Typecheck, outcome, started.elapsed());
    report.files = files.len();
    report.diagnostics = diagnostics;
    Ok(report)
}

/// Hand the selected files to the analyzer's own watch mode and stay
/// attached until it exits or Ctrl-C is pressed.
///
/// An empty selection prints the usual nothing-to-do report instead.
pub async fn run_typecheck_watch(
    ctx: &ActionContext,
    analyzer: &dyn TypeAnalyzer,
) -> Result<ActionOutcome> {
    let started = Instant::now();
    let files = ctx.select(ActionKind::Typecheck);
    if files.is_empty() {
        let report = ActionReport::nothing_to_do(ActionKind::Typecheck, started.elapsed());
        report::print(&report, &ctx.cwd);
        return Ok(report.outcome);
    }

    println!("Watching for changes... (Ctrl-C to stop)");
    info!(files = files.len(), "type checking in watch mode");

    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        code = analyzer.watch(files.into_vec()) => {
            let code = code?;
            if code == 0 {
                Ok(ActionOutcome::Succeeded)
            } else {
                warn!(code, "type checker exited");
                Ok(ActionOutcome::Failed)
            }
        }
        () = interrupted => {
            println!("Stopped watching");
            Ok(ActionOutcome::Succeeded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use std::path::Path;
    use std::sync::Arc;

    #[test]
    fn strict_comes_from_tool_config_only_when_unset() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/tsconfig.json", r#"{ "compilerOptions": {} }"#);
        fs.add_file("/proj/tsgate.config.json", r#"{ "typecheck": { "strict": false } }"#);
        let ctx = ActionContext::load(Arc::new(fs.clone()), "/proj", Path::new("tsconfig.json"), None);
        assert_eq!(analyzer_options(&ctx).strict, Some(false));

        fs.add_file(
            "/proj/tsconfig.json",
            r#"{ "compilerOptions": { "strict": true } }"#,
        );
        let ctx = ActionContext::load(Arc::new(fs), "/proj", Path::new("tsconfig.json"), None);
        assert_eq!(analyzer_options(&ctx).strict, Some(true));
    }
}
