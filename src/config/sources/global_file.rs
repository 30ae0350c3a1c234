//! Global config file source: $XDG_CONFIG_HOME/sketchvfs/config.toml

use crate::config::xdg;
use std::path::PathBuf;
use tracing::debug;

/// Path to global config file.
pub fn global_config_path() -> Option<PathBuf> {
    xdg::config_home()
        .ok()
        .map(|home| home.join("sketchvfs").join("config.toml"))
}

/// The global config file, if present
pub fn existing_path() -> Option<PathBuf> {
    let global_path = global_config_path()?;
    if !global_path.is_file() {
        debug!(config_path = %global_path.display(), "No global configuration file");
        return None;
    }
    Some(dunce::canonicalize(&global_path).unwrap_or(global_path))
}
