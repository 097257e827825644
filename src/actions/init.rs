// src/actions/init.rs

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{ProjectConfig, ToolConfig};
use crate::errors::Result;
use crate::fs::FileSystem;

pub const PROJECT_FILE: &str = "tsconfig.json";
pub const TOOL_FILE: &str = "tsgate.config.json";

/// Write the starter project and tool files into `cwd`, replacing existing
/// ones. Returns the written paths.
pub fn run_init(fs: &dyn FileSystem, cwd: &Path) -> Result<Vec<PathBuf>> {
    let files = [
        (PROJECT_FILE, serde_json::to_string_pretty(&ProjectConfig::starter())?),
        (TOOL_FILE, serde_json::to_string_pretty(&ToolConfig::default())?),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let path = cwd.join(name);
        fs.write(&path, contents.as_bytes())?;
        info!("created {name}");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_project_str;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn writes_both_starter_files() {
        let fs = MockFileSystem::new();
        fs.add_dir("/proj");
        let written = run_init(&fs, Path::new("/proj")).unwrap();
        assert_eq!(
            written,
            vec![
                PathBuf::from("/proj/tsconfig.json"),
                PathBuf::from("/proj/tsgate.config.json")
            ]
        );

        let project =
            parse_project_str(&fs.read_to_string(Path::new("/proj/tsconfig.json")).unwrap())
                .unwrap();
        assert_eq!(project, ProjectConfig::starter());

        let tool: ToolConfig = serde_json::from_str(
            &fs.read_to_string(Path::new("/proj/tsgate.config.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(tool, ToolConfig::default());
    }

    #[test]
    fn existing_files_are_replaced() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/tsconfig.json", "{ broken");
        run_init(&fs, Path::new("/proj")).unwrap();
        let text = fs.read_to_string(Path::new("/proj/tsconfig.json")).unwrap();
        assert!(parse_project_str(&text).is_ok());
    }
}
