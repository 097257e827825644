// src/exec/oxlint.rs

//! `oxlint` as the linter collaborator.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::exec::backend::{BoxFuture, LintReport, LintRequest, LintSummary, Linter};
use crate::exec::locate::{LazyTool, OXLINT};
use crate::exec::process::run_process;
use crate::types::LintFormat;

static SUMMARY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Found (\d+) warnings? and (\d+) errors?").expect("summary regex is valid")
});

#[derive(Debug)]
pub struct OxLinter {
    tool: LazyTool,
}

impl OxLinter {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            tool: LazyTool::new(OXLINT, cwd),
        }
    }
}

impl Linter for OxLinter {
    fn lint(&self, request: LintRequest) -> BoxFuture<'_, Result<LintReport>> {
        Box::pin(async move {
            let program = self.tool.path().await?;
            let args = lint_args(&request);
            let out = run_process(program, &args, self.tool.cwd()).await?;

            let report = out.text_preferring_stdout().to_string();
            let summary = parse_summary(&report);
            debug!(exit_code = out.exit_code(), ?summary, "linter finished");

            Ok(LintReport {
                exit_code: out.exit_code(),
                report,
                summary,
            })
        })
    }
}

/// Command line for `oxlint`. Rule levels map to `-D` (error), `-W` (warn)
/// and `-A` (off); unknown levels are skipped.
pub fn lint_args(request: &LintRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    if request.fix {
        args.push("--fix".into());
    }
    match request.format {
        LintFormat::Pretty => {}
        LintFormat::Json => args.extend(["--format", "json"].map(OsString::from)),
        LintFormat::Github => args.extend(["--format", "github"].map(OsString::from)),
    }
    for (rule, level) in &request.rules {
        let flag = match level.as_str() {
            "error" | "deny" => "-D",
            "warn" | "warning" => "-W",
            "off" | "allow" => "-A",
            other => {
                warn!(rule = %rule, level = other, "unknown lint level; rule ignored");
                continue;
            }
        };
        args.push(flag.into());
        args.push(rule.into());
    }
    args.extend(request.files.iter().map(|p| p.as_os_str().to_owned()));
    args
}

/// Extract `Found N warnings and M errors` when present.
pub fn parse_summary(report: &str) -> Option<LintSummary> {
    let caps = SUMMARY_LINE.captures(report)?;
    Some(LintSummary {
        warnings: caps[1].parse().ok()?,
        errors: caps[2].parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn args_map_rules_and_format() {
        let mut rules = BTreeMap::new();
        rules.insert("no-debugger".to_string(), "error".to_string());
        rules.insert("no-console".to_string(), "warn".to_string());
        rules.insert("eqeqeq".to_string(), "off".to_string());
        rules.insert("weird".to_string(), "sometimes".to_string());

        let req = LintRequest {
            files: vec![PathBuf::from("/p/src/a.ts")],
            fix: true,
            format: LintFormat::Json,
            rules,
        };
        let args: Vec<String> = lint_args(&req)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "--fix",
                "--format",
                "json",
                "-A",
                "eqeqeq",
                "-W",
                "no-console",
                "-D",
                "no-debugger",
                "/p/src/a.ts",
            ]
        );
    }

    #[test]
    fn summary_is_best_effort() {
        assert_eq!(
            parse_summary("\nFound 2 warnings and 1 error.\nFinished in 4ms"),
            Some(LintSummary {
                warnings: 2,
                errors: 1
            })
        );
        assert_eq!(parse_summary("{\"diagnostics\": []}"), None);
    }
}
