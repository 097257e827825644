// src/actions/lint.rs

use std::time::Instant;

use tracing::info;

use crate::actions::{ActionContext, ActionOutcome, ActionReport};
use crate::errors::Result;
use crate::exec::{LintRequest, Linter};
use crate::types::{ActionKind, LintFormat};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LintSettings {
    pub fix: bool,
    pub format: LintFormat,
}

/// Lint every file selected for `lint`, with the rules from the tool config.
///
/// A non-zero linter exit fails the action; the linter's report is kept
/// verbatim.
pub async fn run_lint(
    ctx: &ActionContext,
    linter: &dyn Linter,
    settings: LintSettings,
) -> Result<ActionReport> {
    let started = Instant::now();
    let files = ctx.select(ActionKind::Lint);
    if files.is_empty() {
        return Ok(ActionReport::nothing_to_do(ActionKind::Lint, started.elapsed()));
    }

    info!(files = files.len(), fix = settings.fix, "linting files");
    let count = files.len();
    let result = linter
        .lint(LintRequest {
            files: files.into_vec(),
            fix: settings.fix,
            format: settings.format,
            rules: ctx.tool.lint.rules.clone(),
        })
        .await?;

    let outcome = if result.success() {
        ActionOutcome::Succeeded
    } else {
        ActionOutcome::Failed
    };
    let mut report = ActionReport::new(ActionKind::Lint, outcome, started.elapsed());
    report.files = count;

    if !result.success() {
        if let Some(summary) = result.summary {
            info!(
                warnings = summary.warnings,
                errors = summary.errors,
                "lint summary"
            );
        }
        report.notes.push(if settings.fix {
            "Some issues were auto-fixed".to_string()
        } else {
            "Run with --fix to auto-fix some issues".to_string()
        });
    }
    report.output = Some(result.report);
    Ok(report)
}
