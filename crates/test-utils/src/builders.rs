//! On-disk project trees for integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tempfile::TempDir;

use tsgate::actions::ActionContext;
use tsgate::fs::RealFileSystem;

/// Placeholder contents for source files whose text does not matter.
pub const STUB_SOURCE: &str = "export {};\n";

/// Builder for a temporary project directory.
///
/// ```ignore
/// let project = ProjectBuilder::new()
///     .include(&["src/**/*.ts"])
///     .exclude(&["node_modules"])
///     .files(&["src/index.ts", "node_modules/x/y.ts"])
///     .build();
/// let ctx = project.context();
/// ```
#[derive(Debug, Default)]
pub struct ProjectBuilder {
    files: Vec<(String, String)>,
    tsconfig: Map<String, Value>,
    raw_tsconfig: Option<String>,
    skip_tsconfig: bool,
    tool_config: Option<Value>,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given contents, creating parent directories.
    pub fn file(mut self, rel: &str, contents: &str) -> Self {
        self.files.push((rel.to_string(), contents.to_string()));
        self
    }

    /// Add several files with [`STUB_SOURCE`] contents.
    pub fn files(mut self, rels: &[&str]) -> Self {
        for rel in rels {
            self = self.file(rel, STUB_SOURCE);
        }
        self
    }

    pub fn include(mut self, patterns: &[&str]) -> Self {
        self.tsconfig.insert("include".into(), json!(patterns));
        self
    }

    pub fn exclude(mut self, patterns: &[&str]) -> Self {
        self.tsconfig.insert("exclude".into(), json!(patterns));
        self
    }

    pub fn compiler_option(mut self, key: &str, value: Value) -> Self {
        let options = self
            .tsconfig
            .entry("compilerOptions")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = options {
            map.insert(key.to_string(), value);
        }
        self
    }

    /// Write `text` as `tsconfig.json` verbatim (comments allowed).
    pub fn raw_tsconfig(mut self, text: &str) -> Self {
        self.raw_tsconfig = Some(text.to_string());
        self
    }

    /// Do not write a `tsconfig.json` at all.
    pub fn without_tsconfig(mut self) -> Self {
        self.skip_tsconfig = true;
        self
    }

    /// Write `value` as `tsgate.config.json`.
    pub fn tool_config(mut self, value: Value) -> Self {
        self.tool_config = Some(value);
        self
    }

    pub fn build(self) -> TempProject {
        let dir = tempfile::tempdir().expect("create temp project dir");
        let root = dir
            .path()
            .canonicalize()
            .expect("canonicalize temp project dir");
        let project = TempProject { _dir: dir, root };

        if !self.skip_tsconfig {
            let text = match self.raw_tsconfig {
                Some(text) => text,
                None => serde_json::to_string_pretty(&Value::Object(self.tsconfig))
                    .expect("serialize tsconfig"),
            };
            project.write("tsconfig.json", &text);
        }
        if let Some(tool) = self.tool_config {
            let text = serde_json::to_string_pretty(&tool).expect("serialize tool config");
            project.write("tsgate.config.json", &text);
        }
        for (rel, contents) in &self.files {
            project.write(rel, contents);
        }
        project
    }
}

/// A project directory that is deleted on drop.
#[derive(Debug)]
pub struct TempProject {
    _dir: TempDir,
    root: PathBuf,
}

impl TempProject {
    /// Canonical project root.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `rel` inside the project.
    pub fn abs(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.abs(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write project file");
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.abs(rel)).expect("read project file")
    }

    /// Action context over the real filesystem, using `./tsconfig.json`.
    pub fn context(&self) -> ActionContext {
        ActionContext::load(
            Arc::new(RealFileSystem),
            self.root.clone(),
            Path::new("./tsconfig.json"),
            None,
        )
    }
}
