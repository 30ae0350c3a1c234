//! Tree node types

use crate::tree::path;
use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};

/// Node kind enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Directory => "directory",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific payload of a node
///
/// Directory children are owned and indexed by name, in insertion order.
#[derive(Debug, Clone)]
pub(crate) enum NodeBody {
    File { content: String },
    Directory { children: LinkedHashMap<String, FileNode> },
}

/// A file or directory in the tree, identified by its normalized path
#[derive(Debug, Clone)]
pub struct FileNode {
    path: String,
    pub(crate) body: NodeBody,
}

impl FileNode {
    pub(crate) fn new_file(path: String, content: String) -> Self {
        Self {
            path,
            body: NodeBody::File { content },
        }
    }

    pub(crate) fn new_directory(path: String) -> Self {
        Self {
            path,
            body: NodeBody::Directory {
                children: LinkedHashMap::new(),
            },
        }
    }

    /// Absolute normalized path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Final path segment (empty for root)
    pub fn name(&self) -> &str {
        path::file_name(&self.path)
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::File { .. } => NodeKind::File,
            NodeBody::Directory { .. } => NodeKind::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind() == NodeKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind() == NodeKind::Directory
    }

    /// File content, `None` for directories
    pub fn content(&self) -> Option<&str> {
        match &self.body {
            NodeBody::File { content } => Some(content),
            NodeBody::Directory { .. } => None,
        }
    }

    /// Immediate children in insertion order (empty for files)
    pub fn children(&self) -> impl Iterator<Item = &FileNode> {
        let children = match &self.body {
            NodeBody::Directory { children } => Some(children.values()),
            NodeBody::File { .. } => None,
        };
        children.into_iter().flatten()
    }

    pub fn child_count(&self) -> usize {
        match &self.body {
            NodeBody::Directory { children } => children.len(),
            NodeBody::File { .. } => 0,
        }
    }

    pub(crate) fn child(&self, name: &str) -> Option<&FileNode> {
        match &self.body {
            NodeBody::Directory { children } => children.get(name),
            NodeBody::File { .. } => None,
        }
    }

    pub(crate) fn child_mut(&mut self, name: &str) -> Option<&mut FileNode> {
        match &mut self.body {
            NodeBody::Directory { children } => children.get_mut(name),
            NodeBody::File { .. } => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut LinkedHashMap<String, FileNode>> {
        match &mut self.body {
            NodeBody::Directory { children } => Some(children),
            NodeBody::File { .. } => None,
        }
    }

    /// Number of nodes in this subtree, self included
    pub fn subtree_len(&self) -> usize {
        1 + self.children().map(FileNode::subtree_len).sum::<usize>()
    }

    /// Rewrite this node's path prefix and every descendant's
    pub(crate) fn reprefix(&mut self, old: &str, new: &str) {
        self.path = path::reprefix(&self.path, old, new);
        if let NodeBody::Directory { children } = &mut self.body {
            for child in children.values_mut() {
                child.reprefix(old, new);
            }
        }
    }
}
