// src/types.rs

//! Small shared types: action kinds, collaborator option enums and the
//! result shape every collaborator reports back.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The action a command performs. Drives per-action defaults and the
/// implicit exclusions applied on top of the configured exclude list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Build,
    Typecheck,
    Lint,
    Declarations,
    Watch,
}

impl ActionKind {
    /// Include patterns used when the project file omits `include`.
    pub fn default_include(self) -> &'static [&'static str] {
        match self {
            ActionKind::Build | ActionKind::Typecheck | ActionKind::Declarations => {
                &["**/*.ts", "**/*.tsx"]
            }
            ActionKind::Lint => &["**/*.ts", "**/*.tsx", "**/*.js", "**/*.jsx"],
            ActionKind::Watch => &["src/**/*.ts", "src/**/*.tsx"],
        }
    }

    /// Exclude patterns used when the project file omits `exclude`.
    pub fn default_exclude(self) -> &'static [&'static str] {
        match self {
            ActionKind::Build | ActionKind::Watch => {
                &["node_modules", "dist", "**/*.test.ts", "**/*.spec.ts"]
            }
            ActionKind::Typecheck | ActionKind::Declarations => &[
                "node_modules",
                "dist",
                "**/*.test.ts",
                "**/*.spec.ts",
                "**/*.d.ts",
            ],
            ActionKind::Lint => &["node_modules", "dist", "build"],
        }
    }

    /// Exclusions that always apply for this action, whatever the config says.
    ///
    /// Generated declaration files are never inputs to compilation or type
    /// analysis.
    pub fn implicit_exclude(self) -> &'static [&'static str] {
        match self {
            ActionKind::Build
            | ActionKind::Typecheck
            | ActionKind::Declarations
            | ActionKind::Watch => &["**/*.d.ts"],
            ActionKind::Lint => &[],
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::Build => "build",
            ActionKind::Typecheck => "typecheck",
            ActionKind::Lint => "lint",
            ActionKind::Declarations => "declarations",
            ActionKind::Watch => "watch",
        };
        f.write_str(s)
    }
}

/// Bundler target platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildTarget {
    #[default]
    Bun,
    Node,
    Browser,
}

impl BuildTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildTarget::Bun => "bun",
            BuildTarget::Node => "node",
            BuildTarget::Browser => "browser",
        }
    }
}

impl FromStr for BuildTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bun" => Ok(BuildTarget::Bun),
            "node" => Ok(BuildTarget::Node),
            "browser" => Ok(BuildTarget::Browser),
            other => Err(format!(
                "invalid build target: {other} (expected \"bun\", \"node\" or \"browser\")"
            )),
        }
    }
}

/// Output format requested from the linter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LintFormat {
    #[default]
    Pretty,
    Json,
    Github,
}

/// Severity of a single diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One problem reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// File the diagnostic refers to, when the collaborator names one.
    pub file: Option<PathBuf>,
    pub line: u32,
    pub column: u32,
    pub code: String,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    /// A file-less error carrying only a message (bundler logs, process
    /// failures).
    pub fn message(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: None,
            line: 0,
            column: 0,
            code: code.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match &self.file {
            Some(file) => write!(
                f,
                "{}:{}:{} - {sev} {}: {}",
                file.display(),
                self.line,
                self.column,
                self.code,
                self.message
            ),
            None => write!(f, "{sev} {}: {}", self.code, self.message),
        }
    }
}

/// A file produced by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub size: u64,
}

/// What a collaborator run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollaboratorResult {
    pub success: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub artifacts: Vec<Artifact>,
}

impl CollaboratorResult {
    pub fn succeeded(artifacts: Vec<Artifact>) -> Self {
        Self {
            success: true,
            diagnostics: Vec::new(),
            artifacts,
        }
    }

    pub fn failed(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            success: false,
            diagnostics,
            artifacts: Vec::new(),
        }
    }
}
