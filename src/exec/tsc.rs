// src/exec/tsc.rs

//! The TypeScript compiler as type analyzer and declaration synthesizer.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::config::CompilerOptions;
use crate::errors::Result;
use crate::exec::backend::{
    BoxFuture, DeclarationError, DeclarationOutput, DeclarationSynthesizer, SourceFile,
    TypeAnalyzer,
};
use crate::exec::locate::{LazyTool, TSC};
use crate::exec::process::{run_attached, run_process};
use crate::types::{Diagnostic, Severity};

/// `src/a.ts(3,7): error TS2322: Type 'string' is not assignable ...`
static DIAGNOSTIC_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file>.+?)\((?P<line>\d+),(?P<col>\d+)\): (?P<sev>error|warning) (?P<code>TS\d+): (?P<msg>.*)$",
    )
    .expect("diagnostic regex is valid")
});

/// `error TS5023: Unknown compiler option 'foo'.`
static GLOBAL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sev>error|warning) (?P<code>TS\d+): (?P<msg>.*)$")
        .expect("global diagnostic regex is valid")
});

static TS_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.tsx?$").expect("extension regex is valid"));

/// Type analysis through `tsc --noEmit`.
#[derive(Debug)]
pub struct TscAnalyzer {
    tool: LazyTool,
    options: CompilerOptions,
}

impl TscAnalyzer {
    pub fn new(cwd: impl Into<PathBuf>, options: CompilerOptions) -> Self {
        Self {
            tool: LazyTool::new(TSC, cwd),
            options,
        }
    }
}

impl TypeAnalyzer for TscAnalyzer {
    fn analyze(&self, files: Vec<SourceFile>) -> BoxFuture<'_, Result<Vec<Diagnostic>>> {
        Box::pin(async move {
            let program = self.tool.path().await?;
            let mut args = compiler_flags(&self.options);
            args.extend(["--noEmit", "--pretty", "false"].map(OsString::from));
            args.extend(files.iter().map(|f| f.path.as_os_str().to_owned()));

            let out = run_process(program, &args, self.tool.cwd()).await?;
            let mut diagnostics = parse_diagnostics(&out.stdout, self.tool.cwd());

            if !out.success() && !diagnostics.iter().any(Diagnostic::is_error) {
                let text = out.text_preferring_stdout().trim();
                diagnostics.push(Diagnostic::message(
                    "tsc",
                    if text.is_empty() {
                        format!("tsc exited with code {}", out.exit_code())
                    } else {
                        text.to_string()
                    },
                ));
            }

            debug!(
                files = files.len(),
                diagnostics = diagnostics.len(),
                "type analysis finished"
            );
            Ok(diagnostics)
        })
    }

    fn watch(&self, files: Vec<PathBuf>) -> BoxFuture<'_, Result<i32>> {
        Box::pin(async move {
            let program = self.tool.path().await?;
            let args = watch_args(&self.options, &files);
            let code = run_attached(program, &args, self.tool.cwd()).await?;
            Ok(code.unwrap_or(-1))
        })
    }
}

/// Arguments for `tsc --watch` over `files`. Output keeps the compiler's
/// own formatting since it goes straight to the terminal.
pub fn watch_args(opts: &CompilerOptions, files: &[PathBuf]) -> Vec<OsString> {
    let mut args = compiler_flags(opts);
    args.extend(["--noEmit", "--watch"].map(OsString::from));
    args.extend(files.iter().map(|f| f.as_os_str().to_owned()));
    args
}

/// Declaration output through `tsc --emitDeclarationOnly`, one file per call.
///
/// The compiler reads the file from disk so that relative imports resolve;
/// the `source` argument is not consulted.
#[derive(Debug)]
pub struct TscDeclarations {
    tool: LazyTool,
    options: CompilerOptions,
}

impl TscDeclarations {
    pub fn new(cwd: impl Into<PathBuf>, options: CompilerOptions) -> Self {
        Self {
            tool: LazyTool::new(TSC, cwd),
            options,
        }
    }
}

impl DeclarationSynthesizer for TscDeclarations {
    fn synthesize(
        &self,
        rel_path: String,
        _source: String,
    ) -> BoxFuture<'_, Result<DeclarationOutput>> {
        Box::pin(async move {
            let program = self.tool.path().await?;
            let cwd = self.tool.cwd();
            let scratch = tempfile::tempdir()?;

            let mut args = compiler_flags(&self.options);
            args.extend(
                ["--declaration", "--emitDeclarationOnly", "--pretty", "false"]
                    .map(OsString::from),
            );
            args.push("--outDir".into());
            args.push(scratch.path().as_os_str().to_owned());
            args.push("--rootDir".into());
            args.push(cwd.as_os_str().to_owned());
            args.push(rel_path.clone().into());

            let out = run_process(program, &args, cwd).await?;
            if !out.success() {
                let mut errors: Vec<DeclarationError> = parse_diagnostics(&out.stdout, cwd)
                    .into_iter()
                    .filter(Diagnostic::is_error)
                    .map(|d| DeclarationError {
                        file: d
                            .file
                            .as_deref()
                            .map(|f| f.strip_prefix(cwd).unwrap_or(f).display().to_string())
                            .unwrap_or_else(|| rel_path.clone()),
                        message: d.message,
                    })
                    .collect();
                if errors.is_empty() {
                    errors.push(DeclarationError {
                        file: rel_path.clone(),
                        message: out.text_preferring_stdout().trim().to_string(),
                    });
                }
                return Ok(DeclarationOutput::Errors(errors));
            }

            let emitted = scratch.path().join(declaration_path(&rel_path));
            match std::fs::read_to_string(&emitted) {
                Ok(code) => Ok(DeclarationOutput::Code(code)),
                Err(err) => Ok(DeclarationOutput::Errors(vec![DeclarationError {
                    file: rel_path,
                    message: format!("no declaration emitted ({err})"),
                }])),
            }
        })
    }
}

/// `src/a.ts` -> `src/a.d.ts`, `src/view.tsx` -> `src/view.d.ts`.
pub fn declaration_path(rel_path: &str) -> String {
    TS_EXTENSION.replace(rel_path, ".d.ts").into_owned()
}

/// Command-line flags for the recognised compiler options, then any extra
/// scalar or list options as `--name value`.
///
/// Output-shaping options (`outDir`, `rootDir`, `noEmit`, `declaration`) are
/// left to the caller.
pub fn compiler_flags(opts: &CompilerOptions) -> Vec<OsString> {
    let mut flags: Vec<OsString> = Vec::new();
    let mut push = |name: &str, value: String| {
        flags.push(format!("--{name}").into());
        flags.push(value.into());
    };

    let strings = [
        ("target", &opts.target),
        ("module", &opts.module),
        ("jsx", &opts.jsx),
        ("moduleResolution", &opts.module_resolution),
    ];
    for (name, value) in strings {
        if let Some(v) = value {
            push(name, v.clone());
        }
    }

    let lists = [("lib", &opts.lib), ("types", &opts.types)];
    for (name, value) in lists {
        if let Some(v) = value {
            push(name, v.join(","));
        }
    }

    let bools = [
        ("allowImportingTsExtensions", opts.allow_importing_ts_extensions),
        ("strict", opts.strict),
        ("skipLibCheck", opts.skip_lib_check),
        (
            "forceConsistentCasingInFileNames",
            opts.force_consistent_casing_in_file_names,
        ),
        ("esModuleInterop", opts.es_module_interop),
        ("resolveJsonModule", opts.resolve_json_module),
        ("allowJs", opts.allow_js),
    ];
    for (name, value) in bools {
        if let Some(v) = value {
            push(name, v.to_string());
        }
    }

    for (name, value) in &opts.extra {
        match value {
            Value::Bool(b) => push(name.as_str(), b.to_string()),
            Value::Number(n) => push(name.as_str(), n.to_string()),
            Value::String(s) => push(name.as_str(), s.clone()),
            Value::Array(items) => {
                let joined: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                push(name.as_str(), joined.join(","));
            }
            Value::Null | Value::Object(_) => {
                debug!(option = %name, "compiler option has no command-line form; skipped");
            }
        }
    }

    flags
}

/// Parse `--pretty false` output. Indented continuation lines are appended
/// to the preceding diagnostic's message.
pub fn parse_diagnostics(output: &str, cwd: &Path) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for line in output.lines() {
        if let Some(caps) = DIAGNOSTIC_LINE.captures(line) {
            let file = PathBuf::from(&caps["file"]);
            diagnostics.push(Diagnostic {
                file: Some(if file.is_absolute() { file } else { cwd.join(file) }),
                line: caps["line"].parse().unwrap_or(0),
                column: caps["col"].parse().unwrap_or(0),
                code: caps["code"].to_string(),
                message: caps["msg"].to_string(),
                severity: severity(&caps["sev"]),
            });
        } else if let Some(caps) = GLOBAL_LINE.captures(line) {
            diagnostics.push(Diagnostic {
                severity: severity(&caps["sev"]),
                ..Diagnostic::message(&caps["code"], &caps["msg"])
            });
        } else if line.starts_with(char::is_whitespace) && !line.trim().is_empty() {
            if let Some(last) = diagnostics.last_mut() {
                last.message.push('\n');
                last.message.push_str(line.trim());
            }
        }
    }

    diagnostics
}

fn severity(s: &str) -> Severity {
    if s == "warning" {
        Severity::Warning
    } else {
        Severity::Error
    }
}
