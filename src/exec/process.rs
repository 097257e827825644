// src/exec/process.rs

//! Running an external tool to completion and capturing its output.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, info};

/// Exit status plus captured output of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code, with `-1` standing in for "killed by a signal".
    pub fn exit_code(&self) -> i32 {
        self.code.unwrap_or(-1)
    }

    /// Whichever stream has content, preferring stdout.
    pub fn text_preferring_stdout(&self) -> &str {
        if self.stdout.trim().is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }

    pub fn text_preferring_stderr(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Run `program args...` in `cwd`, wait for it, and capture both streams.
///
/// The child is killed if the returned future is dropped.
pub async fn run_process(program: &Path, args: &[OsString], cwd: &Path) -> Result<ProcessOutput> {
    info!(
        program = %program.display(),
        args = args.len(),
        "starting tool process"
    );

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("running {}", program.display()))?;

    let result = ProcessOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    debug!(
        program = %program.display(),
        exit_code = result.exit_code(),
        stdout_bytes = result.stdout.len(),
        stderr_bytes = result.stderr.len(),
        "tool process exited"
    );

    Ok(result)
}

/// Run `program args...` in `cwd` with the terminal attached and wait for
/// it. Returns the exit code, `None` when killed by a signal.
///
/// The child is killed if the returned future is dropped.
pub async fn run_attached(program: &Path, args: &[OsString], cwd: &Path) -> Result<Option<i32>> {
    info!(
        program = %program.display(),
        args = args.len(),
        "starting attached tool process"
    );

    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .status()
        .await
        .with_context(|| format!("running {}", program.display()))?;

    debug!(program = %program.display(), code = ?status.code(), "attached tool process exited");
    Ok(status.code())
}
