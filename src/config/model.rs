// src/config/model.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ActionKind, BuildTarget};

/// Project file (`tsconfig.json`-like) after comment normalisation.
///
/// ```jsonc
/// {
///   "compilerOptions": { "strict": true },
///   "include": ["src/**/*"],
///   "exclude": ["node_modules", "dist"]
/// }
/// ```
///
/// `include` / `exclude` stay `None` when the file omits them so each action
/// can apply its own defaults (see [`ActionKind::default_include`]).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_options: Option<CompilerOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

impl ProjectConfig {
    /// Configuration used when the project file is missing or malformed.
    pub fn fallback() -> Self {
        Self {
            compiler_options: Some(CompilerOptions {
                target: Some("ES2022".into()),
                module: Some("ESNext".into()),
                lib: Some(vec!["ES2022".into()]),
                module_resolution: Some("bundler".into()),
                strict: Some(true),
                skip_lib_check: Some(true),
                force_consistent_casing_in_file_names: Some(true),
                es_module_interop: Some(true),
                resolve_json_module: Some(true),
                allow_js: Some(true),
                ..CompilerOptions::default()
            }),
            include: Some(vec![
                "src/**/*".into(),
                "**/*.ts".into(),
                "**/*.tsx".into(),
            ]),
            exclude: Some(vec![
                "node_modules".into(),
                "dist".into(),
                "**/*.test.ts".into(),
                "**/*.spec.ts".into(),
            ]),
        }
    }

    /// Contents written by `tsgate init`.
    pub fn starter() -> Self {
        Self {
            compiler_options: Some(CompilerOptions {
                target: Some("ES2022".into()),
                module: Some("ESNext".into()),
                lib: Some(vec!["ES2022".into()]),
                jsx: Some("react-jsx".into()),
                module_resolution: Some("bundler".into()),
                allow_importing_ts_extensions: Some(true),
                strict: Some(true),
                no_emit: Some(true),
                skip_lib_check: Some(true),
                force_consistent_casing_in_file_names: Some(true),
                es_module_interop: Some(true),
                resolve_json_module: Some(true),
                allow_js: Some(true),
                types: Some(vec!["bun-types".into()]),
                ..CompilerOptions::default()
            }),
            include: Some(vec!["src/**/*".into()]),
            exclude: Some(vec!["node_modules".into(), "dist".into()]),
        }
    }

    /// Effective include list for `action`.
    pub fn include_for(&self, action: ActionKind) -> Vec<String> {
        match &self.include {
            Some(list) => list.clone(),
            None => to_owned(action.default_include()),
        }
    }

    /// Effective exclude list for `action`, without implicit exclusions.
    pub fn exclude_for(&self, action: ActionKind) -> Vec<String> {
        match &self.exclude {
            Some(list) => list.clone(),
            None => to_owned(action.default_exclude()),
        }
    }

    pub fn compiler_options(&self) -> CompilerOptions {
        self.compiler_options.clone().unwrap_or_default()
    }
}

fn to_owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|s| s.to_string()).collect()
}

/// Recognised `compilerOptions` entries. Anything else lands in `extra` and
/// is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsx: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_importing_ts_extensions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_emit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_lib_check: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_consistent_casing_in_file_names: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub es_module_interop: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_json_module: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_js: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,

    /// Unrecognised options, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Tool file (`tsgate.config.json`): per-action defaults that CLI flags
/// override. Missing sections and fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolConfig {
    pub build: BuildSection,
    pub typecheck: TypecheckSection,
    pub lint: LintSection,
}

/// `build` section.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildSection {
    pub target: BuildTarget,
    pub outdir: String,
    pub splitting: bool,
    pub minify: bool,
    pub sourcemap: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            target: BuildTarget::Bun,
            outdir: "./dist".to_string(),
            splitting: false,
            minify: false,
            sourcemap: true,
            external: Vec::new(),
        }
    }
}

/// `typecheck` section.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TypecheckSection {
    pub strict: bool,
}

impl Default for TypecheckSection {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// `lint` section. `rules` maps a rule name to `"error"`, `"warn"` or `"off"`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LintSection {
    pub rules: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lists_fall_back_per_action() {
        let cfg: ProjectConfig = serde_json::from_str(r#"{ "compilerOptions": {} }"#).unwrap();
        assert_eq!(cfg.include_for(ActionKind::Watch), vec!["src/**/*.ts", "src/**/*.tsx"]);
        assert_eq!(cfg.exclude_for(ActionKind::Lint), vec!["node_modules", "dist", "build"]);
    }

    #[test]
    fn explicit_lists_win_over_defaults() {
        let cfg: ProjectConfig =
            serde_json::from_str(r#"{ "include": ["lib/**/*.ts"], "exclude": [] }"#).unwrap();
        assert_eq!(cfg.include_for(ActionKind::Build), vec!["lib/**/*.ts"]);
        assert!(cfg.exclude_for(ActionKind::Build).is_empty());
    }

    #[test]
    fn unknown_compiler_options_are_kept() {
        let cfg: ProjectConfig = serde_json::from_str(
            r#"{ "compilerOptions": { "strict": false, "paths": { "@/*": ["src/*"] } } }"#,
        )
        .unwrap();
        let opts = cfg.compiler_options();
        assert_eq!(opts.strict, Some(false));
        assert!(opts.extra.contains_key("paths"));
    }

    #[test]
    fn partial_tool_config_keeps_other_defaults() {
        let cfg: ToolConfig =
            serde_json::from_str(r#"{ "build": { "target": "node", "minify": true } }"#).unwrap();
        assert_eq!(cfg.build.target, BuildTarget::Node);
        assert!(cfg.build.minify);
        assert_eq!(cfg.build.outdir, "./dist");
        assert!(cfg.build.sourcemap);
        assert!(cfg.typecheck.strict);
    }
}
