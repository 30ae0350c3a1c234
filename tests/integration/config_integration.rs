//! Integration tests for configuration driving the CLI run context

use super::test_utils::with_xdg_env;
use sketchvfs::cli::{Commands, RunContext};
use sketchvfs::config::{ConfigLoader, GenerationBackend};
use sketchvfs::error::ApiError;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_default_store_lives_under_xdg_data_home() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    with_xdg_env(&test_dir, || {
        let ctx = RunContext::new(workspace.path().to_path_buf(), None).unwrap();
        ctx.execute(&Commands::Generate {
            prompt: "profile card".to_string(),
            id: "cards".to_string(),
        })
        .unwrap();

        let data_dir = sketchvfs::config::xdg::workspace_data_dir(workspace.path()).unwrap();
        assert!(data_dir.starts_with(test_dir.path().join("data")));
        assert!(data_dir.join("store").is_dir());
        assert!(!workspace.path().join(".sketchvfs").exists());
    });
}

#[test]
fn test_global_preview_settings_reach_the_document() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    std::fs::create_dir_all(test_dir.path().join("sketchvfs")).unwrap();
    std::fs::write(
        test_dir.path().join("sketchvfs").join("config.toml"),
        r#"
[preview]
title = "Sketch Pad"
cdn_base = "https://cdn.example"

[preview.packages]
react = "18.3.1"
"#,
    )
    .unwrap();
    std::fs::write(
        workspace.path().join("sketchvfs.toml"),
        "[storage]\nstore_path = \"state\"\n",
    )
    .unwrap();

    with_xdg_env(&test_dir, || {
        let ctx = RunContext::new(workspace.path().to_path_buf(), None).unwrap();
        assert_eq!(ctx.config().storage.store_path, PathBuf::from("state"));

        ctx.execute(&Commands::Generate {
            prompt: "counter".to_string(),
            id: "demo".to_string(),
        })
        .unwrap();
        let document = ctx
            .execute(&Commands::Preview {
                id: "demo".to_string(),
                out: None,
                import_map: false,
            })
            .unwrap();
        assert!(document.contains("<title>Sketch Pad</title>"));
        assert!(document.contains("https://cdn.example/react@18.3.1"));
        assert!(workspace.path().join("state").is_dir());
    });
}

#[test]
fn test_environment_overrides_reach_the_run_context() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    std::fs::write(
        workspace.path().join("sketchvfs.toml"),
        "[preview]\ntitle = \"Workspace\"\n\n[storage]\nstore_path = \"store\"\n",
    )
    .unwrap();

    with_xdg_env(&test_dir, || {
        std::env::set_var("SKETCHVFS__PREVIEW__TITLE", "From Env");
        let ctx = RunContext::new(workspace.path().to_path_buf(), None).unwrap();
        assert_eq!(ctx.config().preview.title, "From Env");
    });
}

#[test]
fn test_invalid_config_is_rejected_before_opening_the_store() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let config_file = test_dir.path().join("broken.toml");
    std::fs::write(
        &config_file,
        "[generation]\nbackend = \"script\"\n\n[storage]\nstore_path = \"store\"\n",
    )
    .unwrap();

    with_xdg_env(&test_dir, || {
        let config = ConfigLoader::load_from_file(&config_file).unwrap();
        assert_eq!(config.generation.backend, GenerationBackend::Script);

        let result = RunContext::new(workspace.path().to_path_buf(), Some(config_file.clone()));
        assert!(matches!(result, Err(ApiError::ConfigError(msg)) if msg.contains("script_path")));
        assert!(!workspace.path().join("store").exists());
    });
}
