// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::jsonc;
use crate::config::model::{ProjectConfig, ToolConfig};
use crate::errors::{Result, TsgateError};
use crate::fs::FileSystem;

/// Default project file path, relative to the working directory.
pub const DEFAULT_PROJECT_PATH: &str = "./tsconfig.json";

/// Tool file names tried (in order) when `--config` is not given.
pub const TOOL_CONFIG_CANDIDATES: &[&str] = &["./tsgate.config.json", "./.tsgaterc"];

/// Where a loaded project configuration came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Parsed from this file.
    File(PathBuf),
    /// The file was missing or malformed; built-in defaults are in use.
    Defaults { reason: String },
}

/// A project configuration plus its provenance.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ProjectConfig,
    pub source: ConfigSource,
}

impl LoadedConfig {
    pub fn used_defaults(&self) -> bool {
        matches!(self.source, ConfigSource::Defaults { .. })
    }
}

/// Parse a project file strictly: read, normalise comments and trailing
/// commas, deserialize.
pub fn parse_project_file(fs: &dyn FileSystem, path: &Path) -> Result<ProjectConfig> {
    let contents = fs.read_to_string(path)?;
    parse_project_str(&contents)
}

/// Parse project-file text (JSON with comments).
pub fn parse_project_str(contents: &str) -> Result<ProjectConfig> {
    let normalized = jsonc::normalize(contents);
    let config: ProjectConfig = serde_json::from_str(&normalized)?;
    Ok(config)
}

/// Load the project file, substituting [`ProjectConfig::fallback`] (with a
/// warning) when it is missing or malformed. Never fails.
pub fn load_project_config(fs: &dyn FileSystem, path: impl AsRef<Path>) -> LoadedConfig {
    let path = path.as_ref();
    match parse_project_file(fs, path) {
        Ok(config) => {
            debug!(path = %path.display(), "loaded project config");
            LoadedConfig {
                config,
                source: ConfigSource::File(path.to_path_buf()),
            }
        }
        Err(err) => {
            warn!(
                "Could not load project config from {}, using defaults ({err})",
                path.display()
            );
            LoadedConfig {
                config: ProjectConfig::fallback(),
                source: ConfigSource::Defaults {
                    reason: err.to_string(),
                },
            }
        }
    }
}

/// Load the tool file.
///
/// Tries `explicit` (if any) and then [`TOOL_CONFIG_CANDIDATES`] relative to
/// `cwd`; the first existing file that parses wins. Unreadable or malformed
/// candidates are skipped. Falls back to [`ToolConfig::default`].
pub fn load_tool_config(fs: &dyn FileSystem, cwd: &Path, explicit: Option<&Path>) -> ToolConfig {
    let candidates = explicit
        .map(|p| p.to_path_buf())
        .into_iter()
        .chain(TOOL_CONFIG_CANDIDATES.iter().map(PathBuf::from));

    for candidate in candidates {
        let path = if candidate.is_absolute() {
            candidate
        } else {
            cwd.join(candidate)
        };
        if !fs.is_file(&path) {
            continue;
        }
        match read_tool_file(fs, &path) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded tool config");
                return config;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable tool config");
            }
        }
    }

    ToolConfig::default()
}

fn read_tool_file(fs: &dyn FileSystem, path: &Path) -> Result<ToolConfig> {
    let contents = fs.read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| {
        TsgateError::ConfigError(format!("invalid tool config {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::types::BuildTarget;

    #[test]
    fn missing_project_file_uses_fallback() {
        let fs = MockFileSystem::new();
        let loaded = load_project_config(&fs, "/proj/tsconfig.json");
        assert!(loaded.used_defaults());
        assert_eq!(loaded.config, ProjectConfig::fallback());
    }

    #[test]
    fn malformed_project_file_uses_fallback() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/tsconfig.json", "{ include: nope");
        let loaded = load_project_config(&fs, "/proj/tsconfig.json");
        assert!(loaded.used_defaults());
    }

    #[test]
    fn project_file_with_comments_loads() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "/proj/tsconfig.json",
            "{\n  // sources\n  \"include\": [\"src/**/*.ts\",],\n}\n",
        );
        let loaded = load_project_config(&fs, "/proj/tsconfig.json");
        assert_eq!(
            loaded.source,
            ConfigSource::File(PathBuf::from("/proj/tsconfig.json"))
        );
        assert_eq!(loaded.config.include, Some(vec!["src/**/*.ts".to_string()]));
        assert_eq!(loaded.config.exclude, None);
    }

    #[test]
    fn explicit_tool_config_takes_precedence() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/tsgate.config.json", r#"{ "build": { "target": "node" } }"#);
        fs.add_file("/proj/custom.json", r#"{ "build": { "target": "browser" } }"#);

        let cfg = load_tool_config(&fs, Path::new("/proj"), Some(Path::new("custom.json")));
        assert_eq!(cfg.build.target, BuildTarget::Browser);

        let cfg = load_tool_config(&fs, Path::new("/proj"), None);
        assert_eq!(cfg.build.target, BuildTarget::Node);
    }

    #[test]
    fn malformed_tool_config_is_skipped() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/tsgate.config.json", "not json");
        fs.add_file("/proj/.tsgaterc", r#"{ "build": { "minify": true } }"#);
        let cfg = load_tool_config(&fs, Path::new("/proj"), None);
        assert!(cfg.build.minify);
    }
}
