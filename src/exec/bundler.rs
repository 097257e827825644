// src/exec/bundler.rs

//! `bun build` as the bundler collaborator.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::errors::Result;
use crate::exec::backend::{BoxFuture, BundleOutput, BundleRequest, Bundler};
use crate::exec::locate::{BUN, LazyTool};
use crate::exec::process::run_process;
use crate::types::Artifact;

#[derive(Debug)]
pub struct BunBundler {
    tool: LazyTool,
}

impl BunBundler {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            tool: LazyTool::new(BUN, cwd),
        }
    }
}

impl Bundler for BunBundler {
    fn bundle(&self, request: BundleRequest) -> BoxFuture<'_, Result<BundleOutput>> {
        Box::pin(async move {
            let program = self.tool.path().await?;
            let args = build_args(&request, self.tool.cwd());
            let started = whole_seconds(SystemTime::now());

            let out = run_process(program, &args, self.tool.cwd()).await?;

            let logs: Vec<String> = out
                .stderr
                .lines()
                .chain(if out.success() { "".lines() } else { out.stdout.lines() })
                .map(str::trim_end)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();

            let artifacts = if out.success() {
                collect_artifacts(&request.outdir, started)
            } else {
                Vec::new()
            };

            debug!(
                success = out.success(),
                artifacts = artifacts.len(),
                log_lines = logs.len(),
                "bundler finished"
            );

            Ok(BundleOutput {
                success: out.success(),
                artifacts,
                logs,
            })
        })
    }

    fn ensure_available(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.tool.path().await?;
            Ok(())
        })
    }
}

/// Command line for `bun build`.
///
/// Entry outputs mirror the source layout below `root`
/// (`src/a.ts` -> `<outdir>/src/a.js`); chunks and assets get hashed names.
pub fn build_args(request: &BundleRequest, root: &Path) -> Vec<OsString> {
    let opts = &request.options;
    let mut args: Vec<OsString> = vec!["build".into()];
    args.extend(request.entrypoints.iter().map(|p| p.as_os_str().to_owned()));
    args.push("--outdir".into());
    args.push(request.outdir.as_os_str().to_owned());
    args.push("--root".into());
    args.push(root.as_os_str().to_owned());
    args.extend(
        [
            "--entry-naming",
            "[dir]/[name].js",
            "--chunk-naming",
            "[name]-[hash].js",
            "--asset-naming",
            "[name]-[hash].[ext]",
        ]
        .map(OsString::from),
    );
    args.push("--target".into());
    args.push(opts.target.as_str().into());
    if opts.minify {
        args.push("--minify".into());
    }
    if opts.sourcemap {
        args.push("--sourcemap=external".into());
    }
    if opts.splitting {
        args.push("--splitting".into());
    }
    for pkg in &opts.external {
        args.push("--external".into());
        args.push(pkg.into());
    }
    args
}

/// Files under `outdir` written at or after `since`, sorted by path.
fn collect_artifacts(outdir: &Path, since: SystemTime) -> Vec<Artifact> {
    let mut artifacts = Vec::new();
    let mut stack = vec![outdir.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("cannot list output directory {}: {err}", dir.display());
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            if meta.is_dir() {
                stack.push(path);
            } else if meta.is_file() {
                let fresh = meta.modified().map(|m| m >= since).unwrap_or(true);
                if fresh {
                    artifacts.push(Artifact {
                        path,
                        size: meta.len(),
                    });
                }
            }
        }
    }

    artifacts.sort_by(|a, b| a.path.cmp(&b.path));
    artifacts
}

/// Round down to a whole second so coarse filesystem timestamps still
/// compare as "not older" than the start of the run.
fn whole_seconds(t: SystemTime) -> SystemTime {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => UNIX_EPOCH + Duration::from_secs(d.as_secs()),
        Err(_) => t,
    }
}
