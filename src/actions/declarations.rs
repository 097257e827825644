// src/actions/declarations.rs

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::actions::{ActionContext, ActionOutcome, ActionReport};
use crate::errors::Result;
use crate::exec::tsc::declaration_path;
use crate::exec::{DeclarationOutput, DeclarationSynthesizer};
use crate::select::path_utils::relative_str;
use crate::types::{ActionKind, Artifact, Diagnostic};

const DEFAULT_OUTDIR: &str = "./dist";

/// Where declarations go: the CLI flag, else `compilerOptions.outDir`, else
/// `./dist`, resolved against the project directory.
pub fn declaration_outdir(ctx: &ActionContext, cli_outdir: Option<&str>) -> PathBuf {
    let options = ctx.compiler_options();
    let dir = cli_outdir
        .map(str::to_string)
        .or(options.out_dir)
        .unwrap_or_else(|| DEFAULT_OUTDIR.to_string());
    ctx.resolve(dir)
}

/// Generate a `.d.ts` file for every file selected for `declarations`.
///
/// Output paths mirror the source layout below `compilerOptions.rootDir`
/// (default: the project directory). Files whose synthesis fails are skipped
/// and reported; any failure fails the action.
pub async fn run_declarations(
    ctx: &ActionContext,
    synthesizer: &dyn DeclarationSynthesizer,
    cli_outdir: Option<&str>,
) -> Result<ActionReport> {
    let started = Instant::now();
    let files = ctx.select(ActionKind::Declarations);
    if files.is_empty() {
        return Ok(ActionReport::nothing_to_do(
            ActionKind::Declarations,
            started.elapsed(),
        ));
    }

    let outdir = declaration_outdir(ctx, cli_outdir);
    let root_dir = ctx
        .compiler_options()
        .root_dir
        .map(|dir| ctx.resolve(dir))
        .unwrap_or_else(|| ctx.cwd.clone());
    info!(
        files = files.len(),
        outdir = %outdir.display(),
        "generating declaration files"
    );

    let mut artifacts = Vec::new();
    let mut diagnostics = Vec::new();

    for path in &files {
        let Some(rel) = relative_str(&ctx.cwd, path) else {
            continue;
        };

        let source = match ctx.fs.read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                warn!("cannot read {rel}: {err:#}");
                diagnostics.push(file_error(path.clone(), format!("cannot read file: {err}")));
                continue;
            }
        };

        match synthesizer.synthesize(rel.clone(), source).await? {
            DeclarationOutput::Code(code) => {
                let target = outdir.join(declaration_path(&output_rel(&root_dir, path, &rel)));
                ctx.fs.write(&target, code.as_bytes())?;
                debug!(file = %rel, out = %target.display(), "wrote declaration");
                artifacts.push(Artifact {
                    path: target,
                    size: code.len() as u64,
                });
            }
            DeclarationOutput::Errors(errors) => {
                for e in errors {
                    diagnostics.push(file_error(ctx.resolve(&e.file), e.message));
                }
            }
        }
    }

    let outcome = if diagnostics.is_empty() {
        ActionOutcome::Succeeded
    } else {
        ActionOutcome::Failed
    };
    let mut report = ActionReport::new(ActionKind::Declarations, outcome, started.elapsed());
    report.files = files.len();
    report.artifacts = artifacts;
    report.diagnostics = diagnostics;
    report.output_dir = Some(outdir);
    Ok(report)
}

/// Path of `file` below `root_dir`, falling back to its project-relative
/// path for files outside `root_dir`.
fn output_rel(root_dir: &Path, file: &Path, project_rel: &str) -> String {
    relative_str(root_dir, file).unwrap_or_else(|| project_rel.to_string())
}

fn file_error(file: PathBuf, message: String) -> Diagnostic {
    Diagnostic {
        file: Some(file),
        ..Diagnostic::message("declaration", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use std::sync::Arc;

    fn ctx(tsconfig: &str) -> ActionContext {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/tsconfig.json", tsconfig);
        ActionContext::load(Arc::new(fs), "/proj", Path::new("tsconfig.json"), None)
    }

    #[test]
    fn outdir_precedence() {
        let c = ctx(r#"{ "compilerOptions": { "outDir": "./types" } }"#);
        assert_eq!(declaration_outdir(&c, Some("out")), PathBuf::from("/proj/out"));
        assert_eq!(declaration_outdir(&c, None), PathBuf::from("/proj/types"));

        let c = ctx("{}");
        assert_eq!(declaration_outdir(&c, None), PathBuf::from("/proj/dist"));
    }

    #[test]
    fn output_path_is_relative_to_root_dir() {
        assert_eq!(
            output_rel(Path::new("/proj/src"), Path::new("/proj/src/a/b.ts"), "src/a/b.ts"),
            "a/b.ts"
        );
        assert_eq!(
            output_rel(Path::new("/proj/src"), Path::new("/proj/lib/c.ts"), "lib/c.ts"),
            "lib/c.ts"
        );
    }
}
