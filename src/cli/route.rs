//! CLI route: single route table and run context. Dispatches to sessions,
//! the snapshot store, generation, and the preview assembler.

use crate::cli::help::{command_name, project_id};
use crate::cli::output::{
    format_diagnostics, format_listing, format_outcomes, format_preview_summary, format_projects,
};
use crate::cli::parse::Commands;
use crate::config::{ConfigLoader, SketchConfig};
use crate::error::{ApiError, StorageError};
use crate::generation::intent_source_from_config;
use crate::intent::{parse_intents, EditIntent};
use crate::preview::PreviewAssembler;
use crate::session::ProjectSession;
use crate::store::{self, SledSnapshotStore};
use crate::tree::Walker;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, info_span, warn};

/// Runtime context for CLI execution: workspace, configuration, and the
/// snapshot store. Built from workspace path and optional config path.
pub struct RunContext {
    workspace_root: PathBuf,
    config: SketchConfig,
    /// Files the configuration was merged from, lowest precedence first
    config_sources: Vec<PathBuf>,
    store: SledSnapshotStore,
    assembler: PreviewAssembler,
    color: bool,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::resolve(&workspace_root, config_path.as_deref())?;
        let config_sources = match config_path {
            Some(path) => vec![path],
            None => ConfigLoader::layered_files(&workspace_root),
        };

        let store_path = config.storage.resolve_store_path(&workspace_root)?;
        std::fs::create_dir_all(&store_path).map_err(StorageError::IoError)?;
        let store = SledSnapshotStore::new(&store_path)?;
        info!(store = %store_path.display(), "Snapshot store opened");

        Ok(Self {
            workspace_root,
            assembler: PreviewAssembler::new(config.preview.clone()),
            config,
            config_sources,
            store,
            color: false,
        })
    }

    /// Colorize diagnostics in command output
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let span = info_span!(
            "command",
            name = command_name(command),
            project = project_id(command).unwrap_or("-")
        );
        let _guard = span.enter();

        let started = Instant::now();
        let result = self.execute_inner(command);
        match &result {
            Ok(_) => info!(elapsed_ms = started.elapsed().as_millis() as u64, "Command finished"),
            Err(e) => warn!(error = %e, "Command failed"),
        }
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Import { dir, id } => self.handle_import(dir, id),
            Commands::Ls { path, id, format } => {
                let session = self.open(id)?;
                session.read(|tree| -> Result<String, ApiError> {
                    format_listing(&tree.list(path)?, format)
                })
            }
            Commands::View { path, id, range } => {
                let view_range = match range.as_deref() {
                    None => None,
                    Some([start, end]) => Some([*start, *end]),
                    Some(_) => {
                        return Err(ApiError::InvalidIntent(
                            "--range takes START and END".to_string(),
                        ))
                    }
                };
                let session = self.open(id)?;
                let outcome = session.apply(&EditIntent::View {
                    path: path.clone(),
                    view_range,
                })?;
                Ok(outcome.content.unwrap_or_default())
            }
            Commands::Apply { file, id } => {
                let json = std::fs::read_to_string(self.resolve(file))
                    .map_err(StorageError::IoError)?;
                let intents = parse_intents(&json)?;
                self.apply_and_save(id, &intents)
            }
            Commands::Generate { prompt, id } => {
                let source = intent_source_from_config(&self.config.generation, &self.workspace_root)?;
                let intents = source.intents(prompt)?;
                info!(count = intents.len(), "Generated intents");
                self.apply_and_save(id, &intents)
            }
            Commands::Preview {
                id,
                out,
                import_map,
            } => self.handle_preview(id, out.as_deref(), *import_map),
            Commands::Export { id } => {
                let session = self.open(id)?;
                Ok(store::to_json(&session.snapshot())?)
            }
            Commands::Projects => {
                let projects = self
                    .store
                    .ids()?
                    .into_iter()
                    .map(|id| {
                        let saved_at = self.store.saved_at(&id)?;
                        Ok((id, saved_at))
                    })
                    .collect::<Result<Vec<_>, StorageError>>()?;
                Ok(format_projects(&projects))
            }
            Commands::Config => {
                let rendered = toml::to_string_pretty(&self.config).map_err(|e| {
                    ApiError::ConfigError(format!("Failed to render config: {}", e))
                })?;
                let mut output: String = self
                    .config_sources
                    .iter()
                    .map(|source| format!("# source: {}\n", source.display()))
                    .collect();
                if output.is_empty() {
                    output.push_str("# source: built-in defaults\n");
                }
                output.push_str(&rendered);
                Ok(output)
            }
        }
    }

    fn handle_import(&self, dir: &Path, id: &str) -> Result<String, ApiError> {
        let tree = Walker::new(self.resolve(dir)).import()?;
        let files = tree.file_count();
        let session = ProjectSession::from_tree(id, tree);
        session.save(&self.store)?;
        Ok(format!("Imported {} files into project '{}'", files, id))
    }

    /// Apply a batch; the store is only written when every intent succeeds
    fn apply_and_save(&self, id: &str, intents: &[EditIntent]) -> Result<String, ApiError> {
        let session = self.open(id)?;
        let before = session.generation();
        let outcomes = session.apply_all(intents)?;
        if session.generation() != before {
            session.save(&self.store)?;
        }
        Ok(format_outcomes(&outcomes))
    }

    fn handle_preview(
        &self,
        id: &str,
        out: Option<&Path>,
        import_map: bool,
    ) -> Result<String, ApiError> {
        let session = self.open(id)?;
        let artifact = session.preview(&self.assembler)?;
        for diagnostic in &artifact.diagnostics {
            warn!(kind = diagnostic.kind(), "{}", diagnostic);
        }

        let mut output = if import_map {
            artifact.import_map.to_json()
        } else if let Some(out) = out {
            let out = self.resolve(out);
            std::fs::write(&out, &artifact.document).map_err(StorageError::IoError)?;
            format_preview_summary(&artifact, &out)
        } else {
            artifact.document.clone()
        };
        if !artifact.diagnostics.is_empty() && (out.is_some() || import_map) {
            output.push('\n');
            output.push_str(&format_diagnostics(&artifact.diagnostics, self.color));
        }
        Ok(output)
    }

    fn open(&self, id: &str) -> Result<ProjectSession, ApiError> {
        ProjectSession::open(&self.store, id)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }
}
