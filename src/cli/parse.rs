//! CLI parse: clap types for sketchvfs. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Session id used when `--id` is omitted
pub const DEFAULT_PROJECT_ID: &str = "default";

/// sketchvfs CLI - In-memory project trees with live JSX preview
#[derive(Parser)]
#[command(name = "sketchvfs")]
#[command(about = "Edit in-memory project trees and assemble browser previews")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (info level unless --log-level is given)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seed a project from a directory on disk (replaces the stored tree)
    Import {
        /// Directory to import
        dir: PathBuf,
        /// Project id
        #[arg(long, default_value = DEFAULT_PROJECT_ID)]
        id: String,
    },
    /// List a directory of a stored project
    Ls {
        /// Directory path inside the project
        #[arg(default_value = "/")]
        path: String,
        /// Project id
        #[arg(long, default_value = DEFAULT_PROJECT_ID)]
        id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show a file with line numbers, or a directory listing
    View {
        /// Path inside the project
        path: String,
        /// Project id
        #[arg(long, default_value = DEFAULT_PROJECT_ID)]
        id: String,
        /// Line range START END (1-based, inclusive; END -1 reads to the end)
        #[arg(long, num_args = 2, allow_negative_numbers = true, value_names = ["START", "END"])]
        range: Option<Vec<i64>>,
    },
    /// Apply edit intents from a JSON file (object or array)
    Apply {
        /// Intent file
        file: PathBuf,
        /// Project id
        #[arg(long, default_value = DEFAULT_PROJECT_ID)]
        id: String,
    },
    /// Generate a project from a prompt with the configured backend
    Generate {
        /// Prompt text
        prompt: String,
        /// Project id
        #[arg(long, default_value = DEFAULT_PROJECT_ID)]
        id: String,
    },
    /// Assemble the preview document
    Preview {
        /// Project id
        #[arg(long, default_value = DEFAULT_PROJECT_ID)]
        id: String,
        /// Write the document here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the import map instead of the document
        #[arg(long)]
        import_map: bool,
    },
    /// Print the project snapshot as JSON
    Export {
        /// Project id
        #[arg(long, default_value = DEFAULT_PROJECT_ID)]
        id: String,
    },
    /// List stored projects
    Projects,
    /// Print the effective configuration as TOML
    Config,
}
