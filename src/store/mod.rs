//! Tree Snapshots
//!
//! Conversion boundary between the live [`FileTree`] and its persisted form.
//! A snapshot is a plain nested structure (ordered child lists, no live map
//! types) that storage collaborators can hold as JSON or bytes.

pub mod persistence;

pub use persistence::{MemorySnapshotStore, SledSnapshotStore};

use crate::error::{StorageError, TreeError};
use crate::tree::path::{self, ROOT};
use crate::tree::{FileNode, FileTree, NodeKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// One node of a snapshot
///
/// Files carry `content`, directories carry `children`; anything else is
/// rejected by [`deserialize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub path: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<SnapshotNode>>,
}

/// Serialized tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub root: SnapshotNode,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl TreeSnapshot {
    /// Flat `(path, kind, content)` tuples, depth-first
    pub fn entries(&self) -> Vec<(String, NodeKind, Option<String>)> {
        let mut out = Vec::new();
        collect_entries(&self.root, &mut out);
        out
    }
}

fn collect_entries(node: &SnapshotNode, out: &mut Vec<(String, NodeKind, Option<String>)>) {
    out.push((node.path.clone(), node.kind, node.content.clone()));
    for child in node.children.iter().flatten() {
        collect_entries(child, out);
    }
}

/// Snapshot storage collaborator
pub trait SnapshotStore {
    /// Load the snapshot stored under `id`, if any
    fn load(&self, id: &str) -> Result<Option<TreeSnapshot>, StorageError>;
    /// Store (or replace) the snapshot under `id`
    fn save(&self, id: &str, snapshot: &TreeSnapshot) -> Result<(), StorageError>;
}

/// Convert a live tree into its snapshot form
#[instrument(skip(tree), fields(nodes = tree.node_count()))]
pub fn serialize(tree: &FileTree) -> TreeSnapshot {
    TreeSnapshot {
        version: SNAPSHOT_VERSION,
        root: snapshot_node(tree.root()),
    }
}

fn snapshot_node(node: &FileNode) -> SnapshotNode {
    match node.kind() {
        NodeKind::File => SnapshotNode {
            path: node.path().to_string(),
            kind: NodeKind::File,
            content: node.content().map(str::to_string),
            children: None,
        },
        NodeKind::Directory => SnapshotNode {
            path: node.path().to_string(),
            kind: NodeKind::Directory,
            content: None,
            children: Some(node.children().map(snapshot_node).collect()),
        },
    }
}

/// Rebuild a tree from a snapshot, root first, then children depth-first
#[instrument(skip(snapshot))]
pub fn deserialize(snapshot: &TreeSnapshot) -> Result<FileTree, TreeError> {
    let root = &snapshot.root;
    if root.path != ROOT || root.kind != NodeKind::Directory || root.content.is_some() {
        return Err(TreeError::MalformedSnapshot(format!(
            "root must be a directory at {}, got {} at {}",
            ROOT, root.kind, root.path
        )));
    }

    let mut tree = FileTree::new();
    restore_children(&mut tree, ROOT, root.children.as_deref().unwrap_or_default())?;
    debug!(nodes = tree.node_count(), "Snapshot restored");
    Ok(tree)
}

fn restore_children(
    tree: &mut FileTree,
    parent: &str,
    children: &[SnapshotNode],
) -> Result<(), TreeError> {
    for child in children {
        let normalized = path::normalize(&child.path)
            .map_err(|e| TreeError::MalformedSnapshot(e.to_string()))?;
        if normalized != child.path || path::parent_of(&normalized) != Some(parent) {
            return Err(TreeError::MalformedSnapshot(format!(
                "{} is not a canonical child of {}",
                child.path, parent
            )));
        }

        match (child.kind, &child.content, &child.children) {
            (NodeKind::File, _, Some(_)) => {
                return Err(TreeError::MalformedSnapshot(format!(
                    "file {} has children",
                    child.path
                )))
            }
            (NodeKind::Directory, Some(_), _) => {
                return Err(TreeError::MalformedSnapshot(format!(
                    "directory {} has content",
                    child.path
                )))
            }
            (NodeKind::File, content, None) => {
                let content = content.as_deref().unwrap_or_default();
                tree.create(&normalized, NodeKind::File, Some(content))
                    .map_err(collision)?;
            }
            (NodeKind::Directory, None, grandchildren) => {
                tree.create(&normalized, NodeKind::Directory, None)
                    .map_err(collision)?;
                restore_children(
                    tree,
                    &normalized,
                    grandchildren.as_deref().unwrap_or_default(),
                )?;
            }
        }
    }
    Ok(())
}

fn collision(err: TreeError) -> TreeError {
    match err {
        TreeError::AlreadyExists(path) => {
            TreeError::MalformedSnapshot(format!("path collision at {}", path))
        }
        other => TreeError::MalformedSnapshot(other.to_string()),
    }
}

/// Encode a snapshot as pretty JSON for external storage
pub fn to_json(snapshot: &TreeSnapshot) -> Result<String, StorageError> {
    serde_json::to_string_pretty(snapshot).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decode a snapshot from JSON
pub fn from_json(json: &str) -> Result<TreeSnapshot, StorageError> {
    serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))
}
