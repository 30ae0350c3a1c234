//! StorageConfig and store path resolution.

use crate::config::xdg;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_STORE_PATH: &str = ".sketchvfs/store";

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Snapshot store directory (relative to workspace root)
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.store_path.as_os_str().is_empty() {
            return Err("Store path cannot be empty".to_string());
        }
        Ok(())
    }

    /// Resolve the store path to an actual filesystem location.
    ///
    /// The default lives under the XDG data directory; anything else is
    /// taken relative to the workspace root.
    pub fn resolve_store_path(&self, workspace_root: &Path) -> Result<PathBuf, ApiError> {
        if self.store_path == Path::new(DEFAULT_STORE_PATH) {
            Ok(xdg::workspace_data_dir(workspace_root)?.join("store"))
        } else {
            Ok(workspace_root.join(&self.store_path))
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_store_path_is_workspace_relative() {
        let workspace = TempDir::new().unwrap();
        let config = StorageConfig {
            store_path: PathBuf::from("data/store"),
        };
        assert_eq!(
            config.resolve_store_path(workspace.path()).unwrap(),
            workspace.path().join("data/store")
        );
    }

    #[test]
    fn test_empty_store_path_is_invalid() {
        let config = StorageConfig {
            store_path: PathBuf::new(),
        };
        assert!(config.validate().is_err());
    }
}
