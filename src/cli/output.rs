//! CLI output: error mapping and text/json formatters.

use crate::error::{ApiError, AssemblyError, StorageError};
use crate::intent::IntentOutcome;
use crate::preview::PreviewArtifact;
use crate::tree::FileNode;
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::Path;

/// Map domain/service errors to a string for CLI output.
///
/// Assembly failures carry their kind, e.g. `error[UnresolvedImport]`.
pub fn map_error(e: &ApiError, color: bool) -> String {
    let label = match e {
        ApiError::Assembly(err) => format!("error[{}]", err.kind()),
        _ => "error".to_string(),
    };
    if color {
        format!("{}: {}", label.red().bold(), e)
    } else {
        format!("{}: {}", label, e)
    }
}

/// Directory listing as a table or JSON array
pub fn format_listing(nodes: &[&FileNode], format: &str) -> Result<String, ApiError> {
    if format == "json" {
        let arr: Vec<serde_json::Value> = nodes
            .iter()
            .map(|node| {
                serde_json::json!({
                    "path": node.path(),
                    "kind": node.kind().as_str(),
                    "size": entry_size(node),
                })
            })
            .collect();
        return serde_json::to_string_pretty(&arr)
            .map_err(|e| ApiError::StorageError(StorageError::Serialization(e.to_string())));
    }
    if nodes.is_empty() {
        return Ok("(empty)".to_string());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Path", "Kind", "Size"]);
    for node in nodes {
        let size = if node.is_file() {
            format!("{} B", entry_size(node))
        } else {
            format!("{} entries", entry_size(node))
        };
        table.add_row(vec![node.path(), node.kind().as_str(), &size]);
    }
    Ok(table.to_string())
}

/// Bytes for files, direct children for directories
fn entry_size(node: &FileNode) -> usize {
    match node.content() {
        Some(content) => content.len(),
        None => node.child_count(),
    }
}

/// One line per applied intent
pub fn format_outcomes(outcomes: &[IntentOutcome]) -> String {
    outcomes
        .iter()
        .map(|outcome| outcome.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary printed after the document is written to disk
pub fn format_preview_summary(artifact: &PreviewArtifact, out: &Path) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Module", "Import key", "Bytes"]);
    for module in &artifact.modules {
        let bytes = module.code.len().to_string();
        table.add_row(vec![module.path.as_str(), module.key.as_str(), &bytes]);
    }
    for style in &artifact.styles {
        let bytes = style.content.len().to_string();
        table.add_row(vec![style.path.as_str(), "(inlined)", &bytes]);
    }
    format!(
        "Wrote {} (entry {}, fingerprint {})\n{}",
        out.display(),
        artifact.entry,
        &artifact.fingerprint[..12.min(artifact.fingerprint.len())],
        table
    )
}

/// Failures in files the entry never reaches
pub fn format_diagnostics(diagnostics: &[AssemblyError], color: bool) -> String {
    diagnostics
        .iter()
        .map(|diagnostic| {
            let label = format!("warning[{}]", diagnostic.kind());
            if color {
                format!("{}: {}", label.yellow().bold(), diagnostic)
            } else {
                format!("{}: {}", label, diagnostic)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stored projects with their last save time
pub fn format_projects(projects: &[(String, Option<DateTime<Utc>>)]) -> String {
    if projects.is_empty() {
        return "No stored projects".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Project", "Saved"]);
    for (id, saved_at) in projects {
        let saved = saved_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![id.as_str(), saved.as_str()]);
    }
    table.to_string()
}
