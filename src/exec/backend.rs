// src/exec/backend.rs

//! Collaborator trait boundaries.
//!
//! Actions and the watch runtime talk to these traits instead of spawning
//! tools directly. Production code uses the process-backed implementations
//! in [`bundler`](super::bundler), [`tsc`](super::tsc) and
//! [`oxlint`](super::oxlint); tests plug in fakes that record calls.
//!
//! Methods return boxed futures so the traits stay object-safe
//! (`Arc<dyn RebuildAction>`).

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::errors::Result;
use crate::types::{Artifact, BuildTarget, CollaboratorResult, Diagnostic, LintFormat};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Options forwarded to the bundler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleOptions {
    pub target: BuildTarget,
    pub minify: bool,
    /// Emit external source maps.
    pub sourcemap: bool,
    pub splitting: bool,
    /// Packages left as runtime imports.
    pub external: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    /// Absolute paths of every selected source file.
    pub entrypoints: Vec<PathBuf>,
    pub outdir: PathBuf,
    pub options: BundleOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleOutput {
    pub success: bool,
    pub artifacts: Vec<Artifact>,
    pub logs: Vec<String>,
}

/// Turns source files into output artifacts.
pub trait Bundler: Send + Sync {
    fn bundle(&self, request: BundleRequest) -> BoxFuture<'_, Result<BundleOutput>>;

    /// Resolve the underlying tool eagerly. Long-running sessions call this
    /// once at startup so a missing tool fails the command immediately.
    fn ensure_available(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// One input to the type analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

/// Semantic / type analysis over a batch of files.
pub trait TypeAnalyzer: Send + Sync {
    fn analyze(&self, files: Vec<SourceFile>) -> BoxFuture<'_, Result<Vec<Diagnostic>>>;

    /// Keep checking `files` as they change, reporting straight to the
    /// terminal, until the analyzer exits. Returns its exit code.
    fn watch(&self, files: Vec<PathBuf>) -> BoxFuture<'_, Result<i32>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintRequest {
    pub files: Vec<PathBuf>,
    pub fix: bool,
    pub format: LintFormat,
    /// Rule name -> `"error"` / `"warn"` / `"off"`.
    pub rules: BTreeMap<String, String>,
}

/// Counts extracted from a textual lint report, when recognisable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintSummary {
    pub warnings: u32,
    pub errors: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintReport {
    pub exit_code: i32,
    pub report: String,
    pub summary: Option<LintSummary>,
}

impl LintReport {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

pub trait Linter: Send + Sync {
    fn lint(&self, request: LintRequest) -> BoxFuture<'_, Result<LintReport>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationError {
    pub file: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationOutput {
    Code(String),
    Errors(Vec<DeclarationError>),
}

/// Produces declaration text for one source file.
pub trait DeclarationSynthesizer: Send + Sync {
    /// `rel_path` is relative to the project directory.
    fn synthesize(&self, rel_path: String, source: String) -> BoxFuture<'_, Result<DeclarationOutput>>;
}

/// The action a watch session re-runs on every coalesced change.
pub trait RebuildAction: Send + Sync + 'static {
    fn rebuild(&self) -> BoxFuture<'_, Result<CollaboratorResult>>;
}
