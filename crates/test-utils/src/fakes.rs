//! In-process stand-ins for the external collaborators.
//!
//! Each fake records what it was asked to do and answers with a canned
//! result, so action and watch tests never spawn a tool.

use std::collections::HashSet;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use tokio::sync::{Semaphore, mpsc};

use tsgate::errors::Result;
use tsgate::exec::{
    BoxFuture, BundleOutput, BundleRequest, Bundler, DeclarationError, DeclarationOutput,
    DeclarationSynthesizer, LintReport, LintRequest, LintSummary, Linter, RebuildAction,
    SourceFile, TypeAnalyzer,
};
use tsgate::types::{Artifact, CollaboratorResult, Diagnostic};

/// Records every bundle request and returns a fixed output.
#[derive(Debug, Clone)]
pub struct FakeBundler {
    requests: Arc<Mutex<Vec<BundleRequest>>>,
    output: BundleOutput,
}

impl Default for FakeBundler {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBundler {
    /// Succeeds with no artifacts.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            output: BundleOutput {
                success: true,
                artifacts: Vec::new(),
                logs: Vec::new(),
            },
        }
    }

    pub fn with_artifacts(mut self, artifacts: Vec<Artifact>) -> Self {
        self.output.artifacts = artifacts;
        self
    }

    /// Fails, reporting `logs`.
    pub fn failing(logs: &[&str]) -> Self {
        let mut fake = Self::new();
        fake.output = BundleOutput {
            success: false,
            artifacts: Vec::new(),
            logs: logs.iter().map(|s| s.to_string()).collect(),
        };
        fake
    }

    pub fn requests(&self) -> Vec<BundleRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Bundler for FakeBundler {
    fn bundle(&self, request: BundleRequest) -> BoxFuture<'_, Result<BundleOutput>> {
        self.requests.lock().unwrap().push(request);
        let output = self.output.clone();
        Box::pin(async move { Ok(output) })
    }
}

/// Returns the same diagnostics for every batch. Watch mode exits at once
/// with a fixed code.
#[derive(Debug, Clone, Default)]
pub struct FakeAnalyzer {
    batches: Arc<Mutex<Vec<Vec<SourceFile>>>>,
    watched: Arc<Mutex<Vec<Vec<PathBuf>>>>,
    diagnostics: Vec<Diagnostic>,
    watch_exit: i32,
}

impl FakeAnalyzer {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            diagnostics,
            ..Self::default()
        }
    }

    pub fn with_watch_exit(mut self, code: i32) -> Self {
        self.watch_exit = code;
        self
    }

    pub fn batches(&self) -> Vec<Vec<SourceFile>> {
        self.batches.lock().unwrap().clone()
    }

    /// File lists handed to watch mode.
    pub fn watched(&self) -> Vec<Vec<PathBuf>> {
        self.watched.lock().unwrap().clone()
    }
}

impl TypeAnalyzer for FakeAnalyzer {
    fn analyze(&self, files: Vec<SourceFile>) -> BoxFuture<'_, Result<Vec<Diagnostic>>> {
        self.batches.lock().unwrap().push(files);
        let diagnostics = self.diagnostics.clone();
        Box::pin(async move { Ok(diagnostics) })
    }

    fn watch(&self, files: Vec<PathBuf>) -> BoxFuture<'_, Result<i32>> {
        self.watched.lock().unwrap().push(files);
        let code = self.watch_exit;
        Box::pin(async move { Ok(code) })
    }
}

/// Answers every lint request with a fixed exit code and report text.
#[derive(Debug, Clone)]
pub struct FakeLinter {
    requests: Arc<Mutex<Vec<LintRequest>>>,
    exit_code: i32,
    report: String,
}

impl FakeLinter {
    pub fn clean() -> Self {
        Self::with_exit(0, "Found 0 warnings and 0 errors.")
    }

    pub fn with_exit(exit_code: i32, report: &str) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            exit_code,
            report: report.to_string(),
        }
    }

    pub fn requests(&self) -> Vec<LintRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Linter for FakeLinter {
    fn lint(&self, request: LintRequest) -> BoxFuture<'_, Result<LintReport>> {
        self.requests.lock().unwrap().push(request);
        let report = LintReport {
            exit_code: self.exit_code,
            report: self.report.clone(),
            summary: (self.exit_code != 0).then_some(LintSummary {
                warnings: 0,
                errors: 1,
            }),
        };
        Box::pin(async move { Ok(report) })
    }
}

/// Emits a stub declaration per file, or an error for the files passed to
/// [`fail_on`](Self::fail_on).
#[derive(Debug, Clone, Default)]
pub struct FakeDeclarations {
    seen: Arc<Mutex<Vec<String>>>,
    failing: HashSet<String>,
}

impl FakeDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an error instead of code for `rel_path`.
    pub fn fail_on(mut self, rel_path: &str) -> Self {
        self.failing.insert(rel_path.to_string());
        self
    }

    /// Relative paths passed in so far.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    /// Text produced for `rel_path`.
    pub fn declaration_for(rel_path: &str) -> String {
        format!("// {rel_path}\nexport {{}};\n")
    }
}

impl DeclarationSynthesizer for FakeDeclarations {
    fn synthesize(
        &self,
        rel_path: String,
        _source: String,
    ) -> BoxFuture<'_, Result<DeclarationOutput>> {
        self.seen.lock().unwrap().push(rel_path.clone());
        let output = if self.failing.contains(&rel_path) {
            DeclarationOutput::Errors(vec![DeclarationError {
                file: rel_path,
                message: "Declaration emit failed".to_string(),
            }])
        } else {
            DeclarationOutput::Code(Self::declaration_for(&rel_path))
        };
        Box::pin(async move { Ok(output) })
    }
}

/// A rebuild whose completion the test controls.
///
/// Each call reports its 1-based call number on the `started` channel and
/// then waits for a permit from [`release`](Self::release) (unless built with
/// [`ungated`](Self::ungated)). Calls listed with
/// [`fail_call`](Self::fail_call) return an error once released; calls
/// listed with [`panic_call`](Self::panic_call) panic instead.
#[derive(Debug)]
pub struct ControllableRebuild {
    gated: bool,
    gate: Semaphore,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    failing: Mutex<HashSet<usize>>,
    panicking: Mutex<HashSet<usize>>,
    started: mpsc::UnboundedSender<usize>,
}

impl ControllableRebuild {
    /// Every call blocks until released.
    pub fn gated() -> (Arc<Self>, mpsc::UnboundedReceiver<usize>) {
        Self::build(true)
    }

    /// Every call finishes immediately.
    pub fn ungated() -> (Arc<Self>, mpsc::UnboundedReceiver<usize>) {
        Self::build(false)
    }

    fn build(gated: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<usize>) {
        let (started, rx) = mpsc::unbounded_channel();
        let action = Self {
            gated,
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            failing: Mutex::new(HashSet::new()),
            panicking: Mutex::new(HashSet::new()),
            started,
        };
        (Arc::new(action), rx)
    }

    /// Let `n` blocked (or future) calls finish.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Make the `call`-th rebuild (1-based) fail.
    pub fn fail_call(&self, call: usize) {
        self.failing.lock().unwrap().insert(call);
    }

    /// Make the `call`-th rebuild (1-based) panic.
    pub fn panic_call(&self, call: usize) {
        self.panicking.lock().unwrap().insert(call);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of rebuilds observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl RebuildAction for ControllableRebuild {
    fn rebuild(&self) -> BoxFuture<'_, Result<CollaboratorResult>> {
        Box::pin(async move {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);
            let _ = self.started.send(call);

            if self.gated {
                if let Ok(permit) = self.gate.acquire().await {
                    permit.forget();
                }
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            let panics = self.panicking.lock().unwrap().contains(&call);
            if panics {
                panic!("rebuild {call} panicked");
            }
            if self.failing.lock().unwrap().contains(&call) {
                return Err(anyhow!("rebuild {call} failed").into());
            }
            Ok(CollaboratorResult::succeeded(Vec::new()))
        })
    }
}

/// An in-memory `Write` sink whose contents stay readable after it has
/// been boxed and handed away.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
