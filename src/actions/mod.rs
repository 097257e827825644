// src/actions/mod.rs

//! The user-facing commands.
//!
//! Every action follows the same shape: build [`SelectionRules`] for its
//! [`ActionKind`], select files, stop early with
//! [`ActionOutcome::NothingToDo`] on an empty selection, otherwise hand the
//! files to a collaborator and turn its answer into an [`ActionReport`].
//!
//! Collaborators are passed in as trait objects ([`Collaborators`]), so
//! tests can drive every action without external tools.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{
    CompilerOptions, LoadedConfig, ProjectConfig, ToolConfig, load_project_config,
    load_tool_config,
};
use crate::exec::{
    BunBundler, Bundler, DeclarationSynthesizer, Linter, OxLinter, TscAnalyzer, TscDeclarations,
    TypeAnalyzer,
};
use crate::fs::FileSystem;
use crate::select::path_utils::relative_str;
use crate::select::{FileSelector, FileSet, SelectionRules};
use crate::types::{ActionKind, Artifact, Diagnostic};

pub mod build;
pub mod declarations;
pub mod init;
pub mod lint;
pub mod report;
pub mod typecheck;
pub mod watch;

pub use build::{BuildAction, BuildOverrides, BuildSettings, run_build};
pub use declarations::run_declarations;
pub use init::run_init;
pub use lint::{LintSettings, run_lint};
pub use typecheck::{run_typecheck, run_typecheck_watch};
pub use watch::{preserve_watch_output, run_watch};

/// How an action ended. Maps onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded,
    /// The selection was empty; no collaborator was invoked.
    NothingToDo,
    Failed,
}

impl ActionOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            ActionOutcome::Succeeded | ActionOutcome::NothingToDo => 0,
            ActionOutcome::Failed => 1,
        }
    }
}

/// Result of one action, ready to be printed.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport {
    pub action: ActionKind,
    pub outcome: ActionOutcome,
    /// Number of selected input files.
    pub files: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub artifacts: Vec<Artifact>,
    /// Where outputs were written, for actions that write any.
    pub output_dir: Option<PathBuf>,
    /// A collaborator's textual report, printed verbatim.
    pub output: Option<String>,
    /// Short follow-up hints shown after the summary.
    pub notes: Vec<String>,
    pub elapsed: Duration,
}

impl ActionReport {
    pub fn new(action: ActionKind, outcome: ActionOutcome, elapsed: Duration) -> Self {
        Self {
            action,
            outcome,
            files: 0,
            diagnostics: Vec::new(),
            artifacts: Vec::new(),
            output_dir: None,
            output: None,
            notes: Vec::new(),
            elapsed,
        }
    }

    pub fn nothing_to_do(action: ActionKind, elapsed: Duration) -> Self {
        Self::new(action, ActionOutcome::NothingToDo, elapsed)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }
}

/// Everything an action needs besides its collaborator: the filesystem, the
/// project directory and both configuration files.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub fs: Arc<dyn FileSystem>,
    /// Canonical project directory; patterns are relative to it.
    pub cwd: PathBuf,
    pub project: LoadedConfig,
    pub tool: ToolConfig,
}

impl ActionContext {
    /// Load both configuration files. Never fails: missing or malformed files
    /// fall back to defaults with a warning.
    pub fn load(
        fs: Arc<dyn FileSystem>,
        cwd: impl Into<PathBuf>,
        project_path: &Path,
        tool_config: Option<&Path>,
    ) -> Self {
        let cwd = cwd.into();
        let cwd = fs.canonicalize(&cwd).unwrap_or(cwd);
        let project = load_project_config(fs.as_ref(), resolve_in(&cwd, project_path));
        let tool = load_tool_config(fs.as_ref(), &cwd, tool_config);
        Self {
            fs,
            cwd,
            project,
            tool,
        }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.project.config
    }

    pub fn compiler_options(&self) -> CompilerOptions {
        self.project.config.compiler_options()
    }

    pub fn rules(&self, action: ActionKind) -> SelectionRules {
        SelectionRules::for_action(&self.project.config, action)
    }

    /// One selection pass for `action`.
    pub fn select(&self, action: ActionKind) -> FileSet {
        FileSelector::new(Arc::clone(&self.fs), self.cwd.clone(), self.rules(action)).select()
    }

    /// `path` resolved against the project directory (`./dist` -> `<cwd>/dist`).
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        resolve_in(&self.cwd, path.as_ref())
    }

    /// `path` relative to the project directory when it lies inside it.
    pub fn display_path(&self, path: &Path) -> String {
        relative_str(&self.cwd, path).unwrap_or_else(|| path.display().to_string())
    }
}

fn resolve_in(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let rel: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    cwd.join(rel)
}

/// The collaborator set used by the one-shot actions.
#[derive(Clone)]
pub struct Collaborators {
    pub bundler: Arc<dyn Bundler>,
    pub analyzer: Arc<dyn TypeAnalyzer>,
    pub linter: Arc<dyn Linter>,
    pub declarations: Arc<dyn DeclarationSynthesizer>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

impl Collaborators {
    /// Process-backed collaborators rooted at the project directory. Tools
    /// are located lazily, on first use.
    pub fn from_tools(ctx: &ActionContext) -> Self {
        Self {
            bundler: Arc::new(BunBundler::new(ctx.cwd.clone())),
            analyzer: Arc::new(TscAnalyzer::new(
                ctx.cwd.clone(),
                typecheck::analyzer_options(ctx),
            )),
            linter: Arc::new(OxLinter::new(ctx.cwd.clone())),
            declarations: Arc::new(TscDeclarations::new(ctx.cwd.clone(), ctx.compiler_options())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn exit_codes() {
        assert_eq!(ActionOutcome::Succeeded.exit_code(), 0);
        assert_eq!(ActionOutcome::NothingToDo.exit_code(), 0);
        assert_eq!(ActionOutcome::Failed.exit_code(), 1);
    }

    #[test]
    fn context_resolves_paths_against_project_dir() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/tsconfig.json", r#"{ "include": ["src/**/*.ts"] }"#);
        let ctx = ActionContext::load(
            Arc::new(fs),
            "/proj",
            Path::new("./tsconfig.json"),
            None,
        );

        assert!(!ctx.project.used_defaults());
        assert_eq!(ctx.resolve("./dist"), PathBuf::from("/proj/dist"));
        assert_eq!(ctx.resolve("/abs/out"), PathBuf::from("/abs/out"));
        assert_eq!(ctx.display_path(Path::new("/proj/src/a.ts")), "src/a.ts");
        assert_eq!(ctx.display_path(Path::new("/other/a.ts")), "/other/a.ts");
    }
}
