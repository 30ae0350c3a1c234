//! ConfigLoader: stacks the sources over the built-in defaults.
//!
//! Precedence, lowest first: defaults, the global file, workspace
//! `sketchvfs.toml`, workspace `config/{SKETCHVFS_ENV}.toml`, then
//! `SKETCHVFS__*` variables. An explicit file replaces both file layers.

use super::defaults;
use super::sources::{environment, global_file, workspace_file};
use super::SketchConfig;
use crate::error::ApiError;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Global config file path ($XDG_CONFIG_HOME/sketchvfs/config.toml)
    pub fn xdg_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    /// Config files found for `workspace_root`, lowest precedence first
    pub fn layered_files(workspace_root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = global_file::existing_path().into_iter().collect();
        files.extend(workspace_file::existing_paths(workspace_root));
        files
    }

    /// Load configuration from files and environment.
    pub fn load(workspace_root: &Path) -> Result<SketchConfig, ConfigError> {
        Self::build(&Self::layered_files(workspace_root))
    }

    /// Load configuration from one file with the environment on top.
    pub fn load_from_file(path: &Path) -> Result<SketchConfig, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        Self::build(&[path.to_path_buf()])
    }

    /// Validated configuration for a run, from `explicit` when given
    pub fn resolve(
        workspace_root: &Path,
        explicit: Option<&Path>,
    ) -> Result<SketchConfig, ApiError> {
        let config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load(workspace_root)?,
        };
        config.validated()
    }

    fn build(files: &[PathBuf]) -> Result<SketchConfig, ConfigError> {
        let mut builder = defaults::builder_with_defaults()?;
        for file in files {
            debug!(config_path = %file.display(), "Configuration layer");
            builder = builder.add_source(File::from(file.clone()));
        }
        let builder = environment::add_to_builder(builder)?;
        builder.build()?.try_deserialize()
    }
}
