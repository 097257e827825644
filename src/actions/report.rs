// src/actions/report.rs

//! Human-readable rendering of [`ActionReport`]s.
//!
//! Rendering is separated from printing so the exact lines can be tested.

use std::path::Path;
use std::time::Duration;

use crate::actions::{ActionOutcome, ActionReport};
use crate::select::path_utils::relative_str;
use crate::types::ActionKind;

/// Which stream a rendered line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub stream: Stream,
    pub text: String,
}

impl Line {
    fn out(text: impl Into<String>) -> Self {
        Self {
            stream: Stream::Stdout,
            text: text.into(),
        }
    }

    fn err(text: impl Into<String>) -> Self {
        Self {
            stream: Stream::Stderr,
            text: text.into(),
        }
    }
}

/// `123ms` below one second, `1.23s` above.
pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_secs_f64() * 1000.0;
    if ms < 1000.0 {
        format!("{ms:.0}ms")
    } else {
        format!("{:.2}s", ms / 1000.0)
    }
}

/// `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

/// The lines printed for `report`. Paths are shown relative to `cwd` where
/// possible.
pub fn render(report: &ActionReport, cwd: &Path) -> Vec<Line> {
    let mut lines = Vec::new();
    let elapsed = format_elapsed(report.elapsed);
    let show = |p: &Path| relative_str(cwd, p).unwrap_or_else(|| p.display().to_string());

    if report.outcome == ActionOutcome::NothingToDo {
        lines.push(Line::out(format!(
            "No TypeScript files found to {}",
            verb(report.action)
        )));
        return lines;
    }

    if let Some(output) = &report.output {
        let trimmed = output.trim_end();
        if !trimmed.is_empty() {
            lines.push(Line::out(trimmed));
        }
    }

    match report.action {
        ActionKind::Build | ActionKind::Watch => match report.outcome {
            ActionOutcome::Failed => {
                lines.push(Line::err("Build failed:"));
                for d in &report.diagnostics {
                    lines.push(Line::err(format!("  {}", d.message)));
                }
            }
            _ => {
                lines.push(Line::out(format!("Build completed in {elapsed}")));
                if let Some(dir) = &report.output_dir {
                    lines.push(Line::out(format!("Output: {}", show(dir))));
                }
                if !report.artifacts.is_empty() {
                    lines.push(Line::out("Generated files:"));
                    for a in &report.artifacts {
                        lines.push(Line::out(format!(
                            "  • {} ({})",
                            show(&a.path),
                            format_size(a.size)
                        )));
                    }
                }
            }
        },
        ActionKind::Typecheck => {
            for d in &report.diagnostics {
                let line = diagnostic_line(d, cwd);
                lines.push(if d.is_error() {
                    Line::err(line)
                } else {
                    Line::out(line)
                });
            }
            let errors = report.error_count();
            let warnings = report.warning_count();
            if errors == 0 {
                lines.push(Line::out(format!("No type errors found ({elapsed})")));
                if warnings > 0 {
                    lines.push(Line::out(format!("{warnings} warning(s) found")));
                }
            } else {
                lines.push(Line::err(format!("Found {errors} error(s)")));
            }
        }
        ActionKind::Lint => {
            if report.outcome == ActionOutcome::Succeeded {
                lines.push(Line::out(format!("No linting issues found ({elapsed})")));
            }
        }
        ActionKind::Declarations => {
            for d in &report.diagnostics {
                let file = d.file.as_deref().map(show).unwrap_or_default();
                lines.push(Line::err(format!("Error in {file}: {}", d.message)));
            }
            let generated = report.artifacts.len();
            if report.outcome == ActionOutcome::Failed {
                lines.push(Line::out(format!(
                    "Generated {generated} files with {} errors ({elapsed})",
                    report.error_count()
                )));
            } else {
                lines.push(Line::out(format!(
                    "Generated {generated} declaration files ({elapsed})"
                )));
                if let Some(dir) = &report.output_dir {
                    lines.push(Line::out(format!("Output: {}", show(dir))));
                }
            }
        }
    }

    for note in &report.notes {
        lines.push(Line::out(note.clone()));
    }

    lines
}

/// Print `render(report, cwd)` to stdout / stderr.
pub fn print(report: &ActionReport, cwd: &Path) {
    for line in render(report, cwd) {
        match line.stream {
            Stream::Stdout => println!("{}", line.text),
            Stream::Stderr => eprintln!("{}", line.text),
        }
    }
}

fn verb(action: ActionKind) -> &'static str {
    match action {
        ActionKind::Build | ActionKind::Watch => "build",
        ActionKind::Typecheck => "check",
        ActionKind::Lint => "lint",
        ActionKind::Declarations => "declare",
    }
}

fn diagnostic_line(d: &crate::types::Diagnostic, cwd: &Path) -> String {
    match &d.file {
        Some(file) => {
            let mut shown = d.clone();
            if let Some(rel) = relative_str(cwd, file) {
                shown.file = Some(rel.into());
            }
            shown.to_string()
        }
        None => d.to_string(),
    }
}
