// src/exec/locate.rs

//! Finding external tools.
//!
//! Each tool has an ordered list of candidates: project-local installs under
//! `node_modules` first, then the bare program name resolved through `PATH`.
//! The first candidate whose `--version` check exits successfully wins.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::errors::{Result, TsgateError};

/// Static description of an external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    /// Paths relative to the project directory, tried in order.
    pub local_candidates: &'static [&'static str],
    /// Shown to the user when nothing is found.
    pub install_hint: &'static str,
}

pub const BUN: ToolSpec = ToolSpec {
    name: "bun",
    local_candidates: &["node_modules/.bin/bun"],
    install_hint: "curl -fsSL https://bun.sh/install | bash",
};

pub const TSC: ToolSpec = ToolSpec {
    name: "tsc",
    local_candidates: &["node_modules/.bin/tsc", "node_modules/typescript/bin/tsc"],
    install_hint: "bun add -d typescript",
};

pub const OXLINT: ToolSpec = ToolSpec {
    name: "oxlint",
    local_candidates: &["node_modules/.bin/oxlint"],
    install_hint: "bun add -d oxlint",
};

impl ToolSpec {
    /// Every candidate in lookup order.
    pub fn candidates(&self, cwd: &Path) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = self
            .local_candidates
            .iter()
            .map(|rel| cwd.join(rel))
            .collect();
        out.push(PathBuf::from(self.name));
        out
    }

    fn unavailable(&self) -> TsgateError {
        TsgateError::CollaboratorUnavailable {
            tool: self.name.to_string(),
            hint: self.install_hint.to_string(),
        }
    }
}

/// Try candidates in order and return the first one that runs.
pub async fn locate(spec: &ToolSpec, cwd: &Path) -> Result<PathBuf> {
    for candidate in spec.candidates(cwd) {
        if candidate.is_absolute() && !candidate.is_file() {
            continue;
        }
        if answers_version(&candidate, cwd).await {
            info!(tool = spec.name, path = %candidate.display(), "located tool");
            return Ok(candidate);
        }
        debug!(tool = spec.name, candidate = %candidate.display(), "candidate rejected");
    }
    Err(spec.unavailable())
}

async fn answers_version(program: &Path, cwd: &Path) -> bool {
    let status = Command::new(program)
        .arg("--version")
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await;
    matches!(status, Ok(s) if s.success())
}

/// A tool that is located on first use and remembered afterwards.
///
/// Commands that end up with nothing to do never pay for the lookup.
#[derive(Debug)]
pub struct LazyTool {
    spec: ToolSpec,
    cwd: PathBuf,
    resolved: OnceCell<PathBuf>,
}

impl LazyTool {
    pub fn new(spec: ToolSpec, cwd: impl Into<PathBuf>) -> Self {
        Self {
            spec,
            cwd: cwd.into(),
            resolved: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// The resolved program path, probing on the first call.
    pub async fn path(&self) -> Result<&Path> {
        let path = self
            .resolved
            .get_or_try_init(|| locate(&self.spec, &self.cwd))
            .await?;
        Ok(path.as_path())
    }
}
