// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_PROJECT_PATH;
use crate::types::{BuildTarget, LintFormat};

/// Command-line arguments for `tsgate`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tsgate",
    version,
    about = "Build, type-check, lint and watch TypeScript projects.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TSGATE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Tool config file. Defaults to `./tsgate.config.json`, then
    /// `./.tsgaterc`.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Bundle TypeScript sources.
    Build(BuildArgs),
    /// Type-check TypeScript sources.
    #[command(alias = "tsc")]
    Typecheck(TypecheckArgs),
    /// Lint sources with oxlint.
    Lint(LintArgs),
    /// Generate `.d.ts` declaration files.
    #[command(alias = "dts")]
    Declarations(DeclarationArgs),
    /// Rebuild whenever a selected source file changes.
    Watch(WatchArgs),
    /// Write starter `tsconfig.json` and `tsgate.config.json` files.
    Init,
}

impl Command {
    /// Project file for commands that read one.
    pub fn project(&self) -> Option<&Path> {
        match self {
            Command::Build(a) => Some(a.project.project.as_path()),
            Command::Watch(a) => Some(a.build.project.project.as_path()),
            Command::Typecheck(a) => Some(a.project.project.as_path()),
            Command::Lint(a) => Some(a.project.project.as_path()),
            Command::Declarations(a) => Some(a.project.project.as_path()),
            Command::Init => None,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ProjectArgs {
    /// Path to the project file.
    #[arg(short = 'p', long, value_name = "PATH", default_value = DEFAULT_PROJECT_PATH)]
    pub project: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output directory (overrides the tool config).
    #[arg(short = 'o', long, value_name = "DIR")]
    pub outdir: Option<String>,

    /// Bundler target platform.
    #[arg(long, value_enum)]
    pub target: Option<BuildTarget>,

    /// Minify output.
    #[arg(long)]
    pub minify: bool,

    /// Emit external source maps.
    #[arg(long)]
    pub sourcemap: bool,

    /// Enable code splitting.
    #[arg(long)]
    pub splitting: bool,

    /// Packages to leave as runtime imports.
    #[arg(long, value_name = "PKG", num_args = 1..)]
    pub external: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct TypecheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Keep the compiler running and re-check on every change.
    #[arg(long)]
    pub watch: bool,
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Keep earlier output instead of clearing the screen on each change.
    #[arg(long)]
    pub preserve_watch_output: bool,
}

#[derive(Debug, Clone, Args)]
pub struct LintArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Apply automatic fixes.
    #[arg(long)]
    pub fix: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = LintFormat::Pretty)]
    pub format: LintFormat,
}

#[derive(Debug, Clone, Args)]
pub struct DeclarationArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output directory for declaration files.
    #[arg(short = 'o', long, value_name = "DIR")]
    pub outdir: Option<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_and_defaults() {
        let args = CliArgs::try_parse_from(["tsgate", "tsc"]).unwrap();
        assert!(matches!(&args.command, Command::Typecheck(t) if !t.watch));
        assert_eq!(args.command.project(), Some(Path::new("./tsconfig.json")));

        let args = CliArgs::try_parse_from(["tsgate", "dts", "-o", "types"]).unwrap();
        match args.command {
            Command::Declarations(a) => assert_eq!(a.outdir.as_deref(), Some("types")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn build_flags_parse() {
        let args = CliArgs::try_parse_from([
            "tsgate",
            "--log-level",
            "debug",
            "build",
            "-p",
            "app/tsconfig.json",
            "--target",
            "node",
            "--minify",
            "--external",
            "react",
            "react-dom",
        ])
        .unwrap();
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        match args.command {
            Command::Build(b) => {
                assert_eq!(b.project.project, PathBuf::from("app/tsconfig.json"));
                assert_eq!(b.target, Some(BuildTarget::Node));
                assert!(b.minify);
                assert!(!b.splitting);
                assert_eq!(b.external, vec!["react", "react-dom"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn watch_flags_parse() {
        let args = CliArgs::try_parse_from(["tsgate", "typecheck", "--watch", "-p", "a.json"]).unwrap();
        match &args.command {
            Command::Typecheck(t) => assert!(t.watch),
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(args.command.project(), Some(Path::new("a.json")));

        let args = CliArgs::try_parse_from([
            "tsgate",
            "watch",
            "--preserve-watch-output",
            "--minify",
        ])
        .unwrap();
        match args.command {
            Command::Watch(w) => {
                assert!(w.preserve_watch_output);
                assert!(w.build.minify);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let args = CliArgs::try_parse_from(["tsgate", "watch"]).unwrap();
        assert!(matches!(args.command, Command::Watch(w) if !w.preserve_watch_output));
    }

    #[test]
    fn lint_format_is_validated() {
        assert!(CliArgs::try_parse_from(["tsgate", "lint", "--format", "xml"]).is_err());
        let args = CliArgs::try_parse_from(["tsgate", "lint", "--fix", "--format", "github"]).unwrap();
        match args.command {
            Command::Lint(l) => {
                assert!(l.fix);
                assert_eq!(l.format, LintFormat::Github);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
