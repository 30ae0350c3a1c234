//! Configuration System
//!
//! Layered configuration for the preview pipeline, snapshot storage, intent
//! generation, and logging. Sources are merged in order: built-in defaults,
//! the global file, workspace files, then `SKETCHVFS__*` environment
//! variables. Tests included.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

mod defaults;
mod loader;
mod paths;
mod sources;
mod workspace;

pub use loader::ConfigLoader;
pub use workspace::StorageConfig;

/// XDG path helpers
pub mod xdg {
    pub use super::paths::*;
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SketchConfig {
    /// Preview assembly settings
    #[serde(default)]
    pub preview: PreviewConfig,

    /// Snapshot storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Intent generation backend
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How the preview document resolves and boots modules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Base URL of the ES module CDN serving bare packages
    #[serde(default = "default_cdn_base")]
    pub cdn_base: String,

    /// Pinned package versions (name → version)
    #[serde(default = "default_packages")]
    pub packages: BTreeMap<String, String>,

    /// Entry point candidates in priority order
    #[serde(default = "default_entry_candidates")]
    pub entry_candidates: Vec<String>,

    /// Specifier prefix that resolves against the project root
    #[serde(default = "default_alias_prefix")]
    pub alias_prefix: String,

    /// Id of the element the entry component mounts into
    #[serde(default = "default_root_element_id")]
    pub root_element_id: String,

    /// Document title
    #[serde(default = "default_title")]
    pub title: String,
}

pub(crate) fn default_cdn_base() -> String {
    "https://esm.sh".to_string()
}

pub(crate) fn default_packages() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("react".to_string(), "19".to_string()),
        ("react-dom".to_string(), "19".to_string()),
    ])
}

pub(crate) fn default_entry_candidates() -> Vec<String> {
    [
        "/App.jsx",
        "/App.tsx",
        "/index.jsx",
        "/index.tsx",
        "/src/App.jsx",
        "/src/App.tsx",
        "/src/index.jsx",
        "/src/index.tsx",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub(crate) fn default_alias_prefix() -> String {
    "@/".to_string()
}

pub(crate) fn default_root_element_id() -> String {
    "root".to_string()
}

pub(crate) fn default_title() -> String {
    "Preview".to_string()
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            cdn_base: default_cdn_base(),
            packages: default_packages(),
            entry_candidates: default_entry_candidates(),
            alias_prefix: default_alias_prefix(),
            root_element_id: default_root_element_id(),
            title: default_title(),
        }
    }
}

impl PreviewConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.cdn_base.starts_with("http://") && !self.cdn_base.starts_with("https://") {
            return Err(format!("cdn_base must be an http(s) URL, got '{}'", self.cdn_base));
        }
        if self.entry_candidates.is_empty() {
            return Err("At least one entry candidate is required".to_string());
        }
        if let Some(bad) = self.entry_candidates.iter().find(|c| !c.starts_with('/')) {
            return Err(format!("Entry candidate '{}' must be an absolute path", bad));
        }
        // `@` alone would swallow scoped packages like `@tanstack/query`
        let prefix = &self.alias_prefix;
        if prefix.len() < 2 || !prefix.ends_with('/') || prefix.starts_with(['.', '/']) {
            return Err(format!(
                "Alias prefix '{}' must be a non-path prefix ending in '/', e.g. '@/'",
                prefix
            ));
        }
        if self.root_element_id.trim().is_empty() {
            return Err("Root element id cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Which implementation produces edit intents from a prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationBackend {
    /// Deterministic starter projects chosen by keywords
    #[default]
    Mock,
    /// Intents read from a JSON file
    Script,
}

/// Intent generation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub backend: GenerationBackend,

    /// JSON intent file for the script backend
    #[serde(default)]
    pub script_path: Option<PathBuf>,
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.backend == GenerationBackend::Script && self.script_path.is_none() {
            return Err("The script backend requires script_path".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Preview(String),
    Storage(String),
    Generation(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Preview(msg) => write!(f, "Preview: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl SketchConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.preview.validate() {
            errors.push(ValidationError::Preview(e));
        }
        if let Err(e) = self.storage.validate() {
            errors.push(ValidationError::Storage(e));
        }
        if let Err(e) = self.generation.validate() {
            errors.push(ValidationError::Generation(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every failure into one `ApiError::ConfigError`
    pub fn validated(self) -> Result<Self, ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Serializes tests that touch HOME / XDG_CONFIG_HOME / SKETCHVFS__*
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    struct EnvGuard {
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn set(vars: &[(&'static str, Option<&str>)]) -> Self {
            let saved = vars
                .iter()
                .map(|(key, _)| (*key, std::env::var(key).ok()))
                .collect();
            for (key, value) in vars {
                match value {
                    Some(v) => std::env::set_var(key, v),
                    None => std::env::remove_var(key),
                }
            }
            Self { saved }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.saved {
                match value {
                    Some(v) => std::env::set_var(key, v),
                    None => std::env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = SketchConfig::default();
        assert_eq!(config.preview.cdn_base, "https://esm.sh");
        assert_eq!(config.preview.packages.get("react"), Some(&"19".to_string()));
        assert_eq!(config.preview.entry_candidates[0], "/App.jsx");
        assert_eq!(config.preview.entry_candidates.len(), 8);
        assert_eq!(config.generation.backend, GenerationBackend::Mock);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_collects_errors() {
        let mut config = SketchConfig::default();
        config.preview.cdn_base = "esm.sh".to_string();
        config.preview.entry_candidates = vec!["App.jsx".to_string()];
        config.generation.backend = GenerationBackend::Script;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].to_string().starts_with("Preview:"));
        assert!(errors[1].to_string().contains("script_path"));
        assert!(matches!(
            config.validated(),
            Err(ApiError::ConfigError(msg)) if msg.contains("validation failed")
        ));
    }

    #[test]
    fn test_alias_prefix_must_end_with_slash() {
        let mut preview = PreviewConfig::default();
        for bad in ["@", "", "/", "./", "~"] {
            preview.alias_prefix = bad.to_string();
            let err = preview.validate().unwrap_err();
            assert!(err.contains("ending in '/'"), "{bad}: {err}");
        }
        for good in ["@/", "~/", "#src/"] {
            preview.alias_prefix = good.to_string();
            assert!(preview.validate().is_ok(), "{good}");
        }
    }

    #[test]
    fn test_load_from_toml_file() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("custom.toml");
        std::fs::write(
            &config_file,
            r#"
[preview]
cdn_base = "https://cdn.example.com"
title = "Sketch"

[preview.packages]
lodash = "4.17.21"

[generation]
backend = "script"
script_path = "intents.json"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&config_file).unwrap();
        assert_eq!(config.preview.cdn_base, "https://cdn.example.com");
        assert_eq!(config.preview.title, "Sketch");
        assert_eq!(
            config.preview.packages.get("lodash"),
            Some(&"4.17.21".to_string())
        );
        // Defaults survive alongside file entries
        assert_eq!(config.preview.packages.get("react"), Some(&"19".to_string()));
        assert_eq!(config.generation.backend, GenerationBackend::Script);
        assert_eq!(config.preview.root_element_id, "root");
    }

    #[test]
    fn test_workspace_file_overrides_global_file() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let temp_dir = TempDir::new().unwrap();
        let config_home = temp_dir.path().join("xdg");
        let workspace = temp_dir.path().join("workspace");
        std::fs::create_dir_all(config_home.join("sketchvfs")).unwrap();
        std::fs::create_dir_all(&workspace).unwrap();
        let _env = EnvGuard::set(&[
            ("XDG_CONFIG_HOME", config_home.to_str()),
            ("SKETCHVFS_ENV", None),
            ("SKETCHVFS__PREVIEW__TITLE", None),
        ]);

        std::fs::write(
            config_home.join("sketchvfs").join("config.toml"),
            "[preview]\ntitle = \"Global\"\ncdn_base = \"https://global.example\"\n",
        )
        .unwrap();
        std::fs::write(
            workspace.join("sketchvfs.toml"),
            "[preview]\ntitle = \"Workspace\"\n",
        )
        .unwrap();

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.preview.title, "Workspace");
        assert_eq!(config.preview.cdn_base, "https://global.example");
    }

    #[test]
    fn test_layered_files_in_precedence_order() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let temp_dir = TempDir::new().unwrap();
        let config_home = temp_dir.path().join("xdg");
        let workspace = temp_dir.path().join("workspace");
        std::fs::create_dir_all(config_home.join("sketchvfs")).unwrap();
        std::fs::create_dir_all(workspace.join("config")).unwrap();
        let _env = EnvGuard::set(&[
            ("XDG_CONFIG_HOME", config_home.to_str()),
            ("SKETCHVFS_ENV", Some("staging")),
            ("SKETCHVFS__PREVIEW__TITLE", None),
        ]);

        assert!(ConfigLoader::layered_files(&workspace).is_empty());

        std::fs::write(config_home.join("sketchvfs").join("config.toml"), "").unwrap();
        std::fs::write(workspace.join("sketchvfs.toml"), "").unwrap();
        std::fs::write(
            workspace.join("config").join("staging.toml"),
            "[preview]\ntitle = \"Staging\"\n",
        )
        .unwrap();

        let names: Vec<String> = ConfigLoader::layered_files(&workspace)
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["config.toml", "sketchvfs.toml", "staging.toml"]);
        assert_eq!(ConfigLoader::load(&workspace).unwrap().preview.title, "Staging");
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        assert!(matches!(
            ConfigLoader::load_from_file(&missing),
            Err(::config::ConfigError::NotFound(_))
        ));
        assert!(matches!(
            ConfigLoader::resolve(temp_dir.path(), Some(missing.as_path())),
            Err(ApiError::ConfigError(_))
        ));
    }

    #[test]
    fn test_environment_overrides_files() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let temp_dir = TempDir::new().unwrap();
        let _env = EnvGuard::set(&[
            ("XDG_CONFIG_HOME", temp_dir.path().join("none").to_str()),
            ("SKETCHVFS__PREVIEW__TITLE", Some("FromEnv")),
        ]);
        std::fs::write(
            temp_dir.path().join("sketchvfs.toml"),
            "[preview]\ntitle = \"Workspace\"\n",
        )
        .unwrap();

        let config = ConfigLoader::load(temp_dir.path()).unwrap();
        assert_eq!(config.preview.title, "FromEnv");
    }

    #[test]
    fn test_load_without_any_files_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let temp_dir = TempDir::new().unwrap();
        let _env = EnvGuard::set(&[
            ("XDG_CONFIG_HOME", temp_dir.path().join("none").to_str()),
            ("SKETCHVFS__PREVIEW__TITLE", None),
        ]);

        let config = ConfigLoader::load(temp_dir.path()).unwrap();
        assert_eq!(config.preview.title, "Preview");
        assert_eq!(config.preview.entry_candidates, default_entry_candidates());
        assert_eq!(config.storage.store_path, PathBuf::from(".sketchvfs/store"));
    }
}
