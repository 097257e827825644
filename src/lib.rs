// src/lib.rs

pub mod actions;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod select;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::actions::{
    ActionContext, ActionOutcome, BuildOverrides, BuildSettings, Collaborators, LintSettings,
    preserve_watch_output, report, run_build, run_declarations, run_init, run_lint, run_typecheck, run_typecheck_watch,
    run_watch,
};
use crate::cli::{BuildArgs, CliArgs, Command};
use crate::config::DEFAULT_PROJECT_PATH;
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (project file + tool file)
/// - the process-backed collaborators
/// - the selected action
pub async fn run(args: CliArgs) -> Result<ActionOutcome> {
    let cwd = std::env::current_dir()?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    if let Command::Init = args.command {
        init_project(fs.as_ref(), &cwd)?;
        return Ok(ActionOutcome::Succeeded);
    }

    let project = args
        .command
        .project()
        .unwrap_or(Path::new(DEFAULT_PROJECT_PATH));
    let ctx = ActionContext::load(fs, cwd, project, args.config.as_deref());
    debug!(source = ?ctx.project.source, "project configuration loaded");

    let tools = Collaborators::from_tools(&ctx);
    run_command(&ctx, &tools, &args.command).await
}

/// Run one command against an already loaded context.
///
/// Prints the action's report and returns its outcome. `watch` and
/// `typecheck --watch` only return once the session has been stopped.
pub async fn run_command(
    ctx: &ActionContext,
    tools: &Collaborators,
    command: &Command,
) -> Result<ActionOutcome> {
    let report = match command {
        Command::Build(args) => {
            let settings = BuildSettings::resolve(ctx, &build_overrides(args));
            run_build(ctx, tools.bundler.as_ref(), &settings).await?
        }
        Command::Typecheck(args) if args.watch => {
            return run_typecheck_watch(ctx, tools.analyzer.as_ref()).await;
        }
        Command::Typecheck(_) => run_typecheck(ctx, tools.analyzer.as_ref()).await?,
        Command::Lint(args) => {
            let settings = LintSettings {
                fix: args.fix,
                format: args.format,
            };
            run_lint(ctx, tools.linter.as_ref(), settings).await?
        }
        Command::Declarations(args) => {
            run_declarations(ctx, tools.declarations.as_ref(), args.outdir.as_deref()).await?
        }
        Command::Watch(args) => {
            let settings = BuildSettings::resolve(ctx, &build_overrides(&args.build));
            let preserve = preserve_watch_output(ctx, args.preserve_watch_output);
            run_watch(ctx, Arc::clone(&tools.bundler), settings, preserve).await?;
            return Ok(ActionOutcome::Succeeded);
        }
        Command::Init => {
            init_project(ctx.fs.as_ref(), &ctx.cwd)?;
            return Ok(ActionOutcome::Succeeded);
        }
    };

    report::print(&report, &ctx.cwd);
    Ok(report.outcome)
}

fn build_overrides(args: &BuildArgs) -> BuildOverrides {
    BuildOverrides {
        outdir: args.outdir.clone(),
        target: args.target,
        minify: args.minify,
        sourcemap: args.sourcemap,
        splitting: args.splitting,
        external: args.external.clone(),
    }
}

fn init_project(fs: &dyn FileSystem, cwd: &Path) -> Result<()> {
    println!("Initializing new tsgate project...");
    for path in run_init(fs, cwd)? {
        let name = path.file_name().unwrap_or(path.as_os_str());
        println!("Created {}", name.to_string_lossy());
    }
    println!("Project initialized");
    Ok(())
}
