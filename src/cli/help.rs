//! CLI help: command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string for log spans (e.g. "preview", "ls").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Import { .. } => "import",
        Commands::Ls { .. } => "ls",
        Commands::View { .. } => "view",
        Commands::Apply { .. } => "apply",
        Commands::Generate { .. } => "generate",
        Commands::Preview { .. } => "preview",
        Commands::Export { .. } => "export",
        Commands::Projects => "projects",
        Commands::Config => "config",
    }
}

/// Project id the command operates on, if any
pub fn project_id(command: &Commands) -> Option<&str> {
    match command {
        Commands::Import { id, .. }
        | Commands::Ls { id, .. }
        | Commands::View { id, .. }
        | Commands::Apply { id, .. }
        | Commands::Generate { id, .. }
        | Commands::Preview { id, .. }
        | Commands::Export { id } => Some(id),
        Commands::Projects | Commands::Config => None,
    }
}
