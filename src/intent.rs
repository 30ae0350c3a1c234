//! Edit Intents
//!
//! The tool-call boundary between an orchestrating agent and the tree. Each
//! [`EditIntent`] is a JSON object tagged by `command`, mirroring the agent's
//! file-editing tools, and applying one yields a human-readable
//! [`IntentOutcome`] or a structured error.

use crate::error::{ApiError, PatchError, TreeError};
use crate::patch::Occurrences;
use crate::tree::{FileNode, FileTree, NodeKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// One agent tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditIntent {
    /// Show a file with line numbers, or list a directory
    View {
        path: String,
        /// `[start, end]`, 1-based inclusive; `end == -1` reads to the end
        #[serde(default, skip_serializing_if = "Option::is_none")]
        view_range: Option<[i64; 2]>,
    },
    /// Write a file, creating parents and overwriting an existing file
    Create {
        path: String,
        #[serde(default)]
        file_text: String,
    },
    StrReplace {
        path: String,
        old_str: String,
        #[serde(default)]
        new_str: String,
        /// Exact number of matches expected (default 1)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        occurrences: Option<usize>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        replace_all: bool,
    },
    /// Insert after line `insert_line` (0 inserts at the top)
    Insert {
        path: String,
        insert_line: usize,
        new_str: String,
    },
    Rename {
        path: String,
        new_path: String,
    },
    Delete {
        path: String,
    },
    Mkdir {
        path: String,
    },
}

impl EditIntent {
    pub fn command(&self) -> &'static str {
        match self {
            EditIntent::View { .. } => "view",
            EditIntent::Create { .. } => "create",
            EditIntent::StrReplace { .. } => "str_replace",
            EditIntent::Insert { .. } => "insert",
            EditIntent::Rename { .. } => "rename",
            EditIntent::Delete { .. } => "delete",
            EditIntent::Mkdir { .. } => "mkdir",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            EditIntent::View { path, .. }
            | EditIntent::Create { path, .. }
            | EditIntent::StrReplace { path, .. }
            | EditIntent::Insert { path, .. }
            | EditIntent::Rename { path, .. }
            | EditIntent::Delete { path }
            | EditIntent::Mkdir { path } => path,
        }
    }

    /// Whether applying the intent leaves the tree untouched
    pub fn is_read_only(&self) -> bool {
        matches!(self, EditIntent::View { .. })
    }
}

/// Tool result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentOutcome {
    pub message: String,
    /// Rendered view, or the file content after an edit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl IntentOutcome {
    fn message(message: String) -> Self {
        Self {
            message,
            content: None,
        }
    }
}

/// Parse a JSON intent list; a single object is accepted as a list of one
pub fn parse_intents(json: &str) -> Result<Vec<EditIntent>, ApiError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ApiError::InvalidIntent(e.to_string()))?;
    let parsed = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|intent| vec![intent])
    };
    parsed.map_err(|e| ApiError::InvalidIntent(e.to_string()))
}

/// Apply a read-only intent
pub fn view(tree: &FileTree, intent: &EditIntent) -> Result<IntentOutcome, ApiError> {
    match intent {
        EditIntent::View { path, view_range } => {
            check_path(path)?;
            let node = tree.read(path)?;
            let content = if node.is_directory() {
                render_listing(node)
            } else {
                render_file(tree, node.path(), *view_range)?
            };
            Ok(IntentOutcome {
                message: format!("Viewed {}", node.path()),
                content: Some(content),
            })
        }
        other => Err(ApiError::InvalidIntent(format!(
            "{} modifies the tree",
            other.command()
        ))),
    }
}

/// Apply one intent to the tree
#[instrument(skip(tree, intent), fields(command = intent.command(), path = %intent.path()))]
pub fn apply(tree: &mut FileTree, intent: &EditIntent) -> Result<IntentOutcome, ApiError> {
    check_path(intent.path())?;

    let outcome = match intent {
        EditIntent::View { .. } => return view(tree, intent),
        EditIntent::Create { path, file_text } => {
            let existing = tree.read(path).ok().map(FileNode::kind);
            match existing {
                Some(NodeKind::Directory) => {
                    return Err(TreeError::NotAFile(path.clone()).into());
                }
                Some(NodeKind::File) => {
                    tree.update(path, file_text.as_str())?;
                    IntentOutcome::message(format!("File overwritten at: {}", path))
                }
                None => {
                    tree.create_with_parents(path, Some(file_text.as_str()))?;
                    IntentOutcome::message(format!("File created at: {}", path))
                }
            }
        }
        EditIntent::StrReplace {
            path,
            old_str,
            new_str,
            occurrences,
            replace_all,
        } => {
            let expected = Occurrences::from_request(*occurrences, *replace_all);
            let updated = tree.replace_in_file(path, old_str, new_str, expected)?;
            IntentOutcome {
                message: format!("The file {} has been edited", path),
                content: Some(updated),
            }
        }
        EditIntent::Insert {
            path,
            insert_line,
            new_str,
        } => {
            // usize::MAX stays past the end and is reported as OutOfRange
            let line = insert_line.saturating_add(1);
            let updated = tree.insert_in_file(path, line, new_str)?;
            IntentOutcome {
                message: format!("Text inserted after line {} of {}", insert_line, path),
                content: Some(updated),
            }
        }
        EditIntent::Rename { path, new_path } => {
            check_path(new_path)?;
            let moved = tree.rename(path, new_path)?.path().to_string();
            IntentOutcome::message(format!("Renamed {} to {}", path, moved))
        }
        EditIntent::Delete { path } => {
            tree.delete(path)?;
            IntentOutcome::message(format!("Deleted {}", path))
        }
        EditIntent::Mkdir { path } => {
            let created = tree.create_dir_all(path)?.path().to_string();
            IntentOutcome::message(format!("Directory ready at: {}", created))
        }
    };

    debug!(generation = tree.generation(), "Intent applied");
    Ok(outcome)
}

fn check_path(path: &str) -> Result<(), ApiError> {
    if path.trim().is_empty() {
        return Err(ApiError::InvalidIntent("path must not be empty".to_string()));
    }
    Ok(())
}

/// Numbered lines `"{n:>6}\t{text}"`, optionally restricted to a range
pub fn render_file(
    tree: &FileTree,
    path: &str,
    view_range: Option<[i64; 2]>,
) -> Result<String, ApiError> {
    let lines = tree.view_with_line_numbers(path)?;
    let (start, end) = match view_range {
        None => (1, lines.len()),
        Some([start, end]) => {
            let max = lines.len();
            if start < 1 || start as usize > max.max(1) {
                return Err(PatchError::OutOfRange {
                    path: path.to_string(),
                    line: start.max(0) as usize,
                    max,
                }
                .into());
            }
            let end = if end == -1 {
                max
            } else if end < start {
                return Err(ApiError::InvalidIntent(format!(
                    "view_range end {} is before start {}",
                    end, start
                )));
            } else {
                (end as usize).min(max)
            };
            (start as usize, end)
        }
    };

    let rendered: Vec<String> = lines
        .into_iter()
        .filter(|(n, _)| *n >= start && *n <= end)
        .map(|(n, text)| format!("{:>6}\t{}", n, text))
        .collect();
    Ok(rendered.join("\n"))
}

/// Indented listing of a directory subtree, directories suffixed with `/`
pub fn render_listing(dir: &FileNode) -> String {
    let mut lines = vec![dir.path().to_string()];
    push_listing(dir, 1, &mut lines);
    lines.join("\n")
}

fn push_listing(dir: &FileNode, depth: usize, lines: &mut Vec<String>) {
    for child in dir.children() {
        let indent = "  ".repeat(depth);
        if child.is_directory() {
            lines.push(format!("{}{}/", indent, child.name()));
            push_listing(child, depth + 1, lines);
        } else {
            lines.push(format!("{}{}", indent, child.name()));
        }
    }
}
