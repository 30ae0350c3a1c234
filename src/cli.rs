//! CLI domain: parse, route, help, and output only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod route;

pub use help::{command_name, project_id};
pub use output::{
    format_diagnostics, format_listing, format_outcomes, format_preview_summary, format_projects,
    map_error,
};
pub use parse::{Cli, Commands, DEFAULT_PROJECT_ID};
pub use route::RunContext;
