//! Workspace config file source: sketchvfs.toml and config/{env}.toml

use std::path::{Path, PathBuf};

/// Workspace file name at the workspace root
pub const WORKSPACE_CONFIG_FILE: &str = "sketchvfs.toml";

/// Workspace config files present on disk.
/// Precedence: sketchvfs.toml (base) then config/{SKETCHVFS_ENV}.toml (env-specific).
pub fn existing_paths(workspace_root: &Path) -> Vec<PathBuf> {
    let env_name = std::env::var("SKETCHVFS_ENV").unwrap_or_else(|_| "development".to_string());

    [
        workspace_root.join(WORKSPACE_CONFIG_FILE),
        workspace_root
            .join("config")
            .join(format!("{}.toml", env_name)),
    ]
    .into_iter()
    .filter(|candidate| candidate.is_file())
    .collect()
}
