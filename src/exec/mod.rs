// src/exec/mod.rs

//! External collaborators.
//!
//! The bundler, type analyzer, linter and declaration synthesizer are
//! separate programs. This module describes them as traits and drives the
//! real tools as child processes.
//!
//! - [`backend`] defines the collaborator traits (and [`RebuildAction`],
//!   which the watch runtime depends on) so tests can substitute fakes.
//! - [`locate`] finds a tool: project-local install first, then `PATH`.
//! - [`process`] runs a tool to completion and captures its output.
//! - [`bundler`], [`tsc`] and [`oxlint`] are the process-backed
//!   implementations.

pub mod backend;
pub mod bundler;
pub mod locate;
pub mod oxlint;
pub mod process;
pub mod tsc;

pub use backend::{
    BoxFuture, BundleOptions, BundleOutput, BundleRequest, Bundler, DeclarationError,
    DeclarationOutput, DeclarationSynthesizer, LintReport, LintRequest, LintSummary, Linter,
    RebuildAction, SourceFile, TypeAnalyzer,
};
pub use bundler::BunBundler;
pub use locate::{LazyTool, ToolSpec};
pub use oxlint::OxLinter;
pub use tsc::{TscAnalyzer, TscDeclarations};
