// src/actions/build.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::actions::{ActionContext, ActionOutcome, ActionReport, report};
use crate::config::BuildSection;
use crate::errors::Result;
use crate::exec::{BoxFuture, BundleOptions, BundleRequest, Bundler, RebuildAction};
use crate::types::{ActionKind, BuildTarget, CollaboratorResult, Diagnostic};

/// Build flags given on the command line. Unset values fall back to the
/// tool config's `build` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOverrides {
    pub outdir: Option<String>,
    pub target: Option<BuildTarget>,
    pub minify: bool,
    pub sourcemap: bool,
    pub splitting: bool,
    pub external: Vec<String>,
}

/// Fully resolved build settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub outdir: PathBuf,
    pub options: BundleOptions,
}

impl BuildSettings {
    /// Switches turn options on; a non-empty `external` list replaces the
    /// configured one.
    pub fn resolve(ctx: &ActionContext, overrides: &BuildOverrides) -> Self {
        let section: &BuildSection = &ctx.tool.build;
        let outdir = overrides.outdir.as_deref().unwrap_or(&section.outdir);
        let external = if overrides.external.is_empty() {
            section.external.clone()
        } else {
            overrides.external.clone()
        };

        Self {
            outdir: ctx.resolve(outdir),
            options: BundleOptions {
                target: overrides.target.unwrap_or(section.target),
                minify: overrides.minify || section.minify,
                sourcemap: overrides.sourcemap || section.sourcemap,
                splitting: overrides.splitting || section.splitting,
                external,
            },
        }
    }
}

/// Bundle every file selected for `build`.
pub async fn run_build(
    ctx: &ActionContext,
    bundler: &dyn Bundler,
    settings: &BuildSettings,
) -> Result<ActionReport> {
    let started = Instant::now();
    let files = ctx.select(ActionKind::Build);
    if files.is_empty() {
        return Ok(ActionReport::nothing_to_do(ActionKind::Build, started.elapsed()));
    }

    info!(files = files.len(), "building TypeScript files");
    let count = files.len();
    let output = bundler
        .bundle(BundleRequest {
            entrypoints: files.into_vec(),
            outdir: settings.outdir.clone(),
            options: settings.options.clone(),
        })
        .await?;

    let outcome = if output.success {
        ActionOutcome::Succeeded
    } else {
        ActionOutcome::Failed
    };
    let mut report = ActionReport::new(ActionKind::Build, outcome, started.elapsed());
    report.files = count;
    report.output_dir = Some(settings.outdir.clone());
    if output.success {
        report.artifacts = output.artifacts;
    } else {
        report.diagnostics = output
            .logs
            .into_iter()
            .map(|log| Diagnostic::message("bundle", log))
            .collect();
    }
    Ok(report)
}

/// The rebuild a watch session repeats: a fresh selection plus one bundler
/// call, printed like a one-shot build.
pub struct BuildAction {
    ctx: ActionContext,
    bundler: Arc<dyn Bundler>,
    settings: BuildSettings,
}

impl std::fmt::Debug for BuildAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildAction")
            .field("cwd", &self.ctx.cwd)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl BuildAction {
    pub fn new(ctx: ActionContext, bundler: Arc<dyn Bundler>, settings: BuildSettings) -> Self {
        Self {
            ctx,
            bundler,
            settings,
        }
    }
}

impl RebuildAction for BuildAction {
    fn rebuild(&self) -> BoxFuture<'_, Result<CollaboratorResult>> {
        Box::pin(async move {
            let report = run_build(&self.ctx, self.bundler.as_ref(), &self.settings).await?;
            report::print(&report, &self.ctx.cwd);
            Ok(CollaboratorResult {
                success: report.outcome != ActionOutcome::Failed,
                diagnostics: report.diagnostics,
                artifacts: report.artifacts,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use std::path::Path;

    fn ctx_with_tool_config(tool: &str) -> ActionContext {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/tsconfig.json", "{}");
        fs.add_file("/proj/tsgate.config.json", tool);
        ActionContext::load(Arc::new(fs), "/proj", Path::new("tsconfig.json"), None)
    }

    #[test]
    fn cli_overrides_win_over_tool_config() {
        let ctx = ctx_with_tool_config(
            r#"{ "build": { "outdir": "./out", "target": "node", "external": ["a"] } }"#,
        );

        let defaults = BuildSettings::resolve(&ctx, &BuildOverrides::default());
        assert_eq!(defaults.outdir, PathBuf::from("/proj/out"));
        assert_eq!(defaults.options.target, BuildTarget::Node);
        assert!(defaults.options.sourcemap);
        assert_eq!(defaults.options.external, vec!["a"]);

        let overridden = BuildSettings::resolve(
            &ctx,
            &BuildOverrides {
                outdir: Some("build".into()),
                target: Some(BuildTarget::Browser),
                minify: true,
                external: vec!["b".into()],
                ..BuildOverrides::default()
            },
        );
        assert_eq!(overridden.outdir, PathBuf::from("/proj/build"));
        assert_eq!(overridden.options.target, BuildTarget::Browser);
        assert!(overridden.options.minify);
        assert_eq!(overridden.options.external, vec!["b"]);
    }
}
