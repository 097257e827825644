// src/config/mod.rs

//! Configuration loading.
//!
//! - [`model`]: typed project file (`tsconfig.json`-like) and tool file
//!   (`tsgate.config.json`).
//! - [`jsonc`]: comment / trailing-comma normalisation into strict JSON.
//! - [`loader`]: reading both files with documented fallbacks.

pub mod jsonc;
pub mod loader;
pub mod model;

pub use loader::{
    ConfigSource, LoadedConfig, DEFAULT_PROJECT_PATH, load_project_config, load_tool_config,
    parse_project_str,
};
pub use model::{BuildSection, CompilerOptions, LintSection, ProjectConfig, ToolConfig};
