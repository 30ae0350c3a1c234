//! The mutable project tree
//!
//! Every entry point normalizes its path argument before lookup. Mutations
//! validate all preconditions before touching the tree, so a failed call
//! leaves it unchanged.

use crate::error::TreeError;
use crate::tree::node::{FileNode, NodeBody, NodeKind};
use crate::tree::path::{self, ROOT};
use crate::tree::walker::Files;
use tracing::{debug, info, instrument, warn};

/// Hierarchical in-memory store of directories and files
#[derive(Debug, Clone)]
pub struct FileTree {
    root: FileNode,
    /// Bumped on every successful mutation
    generation: u64,
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTree {
    /// Create a tree holding only the root directory
    pub fn new() -> Self {
        Self {
            root: FileNode::new_directory(ROOT.to_string()),
            generation: 0,
        }
    }

    pub fn root(&self) -> &FileNode {
        &self.root
    }

    /// Mutation counter; callers compare it to decide when to rebuild a preview
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Create a file or directory whose parent already exists
    #[instrument(skip(self, content), fields(path = %path, kind = %kind))]
    pub fn create(
        &mut self,
        path: &str,
        kind: NodeKind,
        content: Option<&str>,
    ) -> Result<&FileNode, TreeError> {
        let normalized = path::normalize(path)?;
        let node = match (kind, content) {
            (NodeKind::File, content) => {
                FileNode::new_file(normalized.clone(), content.unwrap_or_default().to_string())
            }
            (NodeKind::Directory, None) => FileNode::new_directory(normalized.clone()),
            (NodeKind::Directory, Some(_)) => return Err(TreeError::NotAFile(normalized)),
        };
        self.attach(node)?;
        debug!("Created node");
        self.node(&normalized)
    }

    /// Create a file, creating every missing ancestor directory with it
    #[instrument(skip(self, content), fields(path = %path))]
    pub fn create_with_parents(
        &mut self,
        path: &str,
        content: Option<&str>,
    ) -> Result<&FileNode, TreeError> {
        let normalized = path::normalize(path)?;
        if normalized == ROOT || self.lookup(&normalized).is_some() {
            return Err(TreeError::AlreadyExists(normalized));
        }
        self.check_ancestors(&normalized)?;

        let parent = path::parent_of(&normalized).unwrap_or(ROOT).to_string();
        let created = self.ensure_directories(&parent)?;
        self.attach(FileNode::new_file(
            normalized.clone(),
            content.unwrap_or_default().to_string(),
        ))?;
        debug!(created_directories = created, "Created file with parents");
        self.node(&normalized)
    }

    /// Create a directory and any missing ancestors; existing directories are kept
    #[instrument(skip(self), fields(path = %path))]
    pub fn create_dir_all(&mut self, path: &str) -> Result<&FileNode, TreeError> {
        let normalized = path::normalize(path)?;
        self.check_ancestors(&normalized)?;
        if let Some(existing) = self.lookup(&normalized) {
            if existing.is_file() {
                return Err(TreeError::NotADirectory(normalized));
            }
        }
        let created = self.ensure_directories(&normalized)?;
        if created > 0 {
            self.touch();
        }
        self.node(&normalized)
    }

    /// Look up a node
    pub fn read(&self, path: &str) -> Result<&FileNode, TreeError> {
        let normalized = path::normalize(path)?;
        self.node(&normalized)
    }

    pub fn exists(&self, path: &str) -> bool {
        path::normalize(path)
            .map(|normalized| self.lookup(&normalized).is_some())
            .unwrap_or(false)
    }

    /// Replace a file's content
    #[instrument(skip(self, content), fields(path = %path))]
    pub fn update(
        &mut self,
        path: &str,
        content: impl Into<String>,
    ) -> Result<&FileNode, TreeError> {
        let normalized = path::normalize(path)?;
        let node = self
            .lookup_mut(&normalized)
            .ok_or_else(|| TreeError::NotFound(normalized.clone()))?;
        match &mut node.body {
            NodeBody::File { content: current } => *current = content.into(),
            NodeBody::Directory { .. } => return Err(TreeError::NotAFile(normalized)),
        }
        self.touch();
        debug!("Updated file content");
        self.node(&normalized)
    }

    /// Remove a node and, for directories, its whole subtree
    #[instrument(skip(self), fields(path = %path))]
    pub fn delete(&mut self, path: &str) -> Result<(), TreeError> {
        let normalized = path::normalize(path)?;
        if normalized == ROOT {
            return Err(TreeError::RootDeletion);
        }
        let parent = path::parent_of(&normalized).unwrap_or(ROOT);
        let removed = self
            .lookup_mut(parent)
            .and_then(FileNode::children_mut)
            .and_then(|siblings| siblings.remove(path::file_name(&normalized)))
            .ok_or_else(|| TreeError::NotFound(normalized.clone()))?;
        self.touch();
        info!(removed = removed.subtree_len(), "Deleted subtree");
        Ok(())
    }

    /// Move a node, re-keying its whole subtree under the new path
    #[instrument(skip(self), fields(from = %old_path, to = %new_path))]
    pub fn rename(&mut self, old_path: &str, new_path: &str) -> Result<&FileNode, TreeError> {
        let from = path::normalize(old_path)?;
        let to = path::normalize(new_path)?;

        // Step 1: validate every precondition before detaching anything
        if from == ROOT {
            return Err(TreeError::InvalidPath("cannot rename root".to_string()));
        }
        if self.lookup(&from).is_none() {
            return Err(TreeError::NotFound(from));
        }
        if self.lookup(&to).is_some() {
            return Err(TreeError::AlreadyExists(to));
        }
        if path::is_ancestor(&from, &to) {
            return Err(TreeError::InvalidPath(format!(
                "cannot move {} into its own descendant {}",
                from, to
            )));
        }
        let to_parent = path::parent_of(&to).unwrap_or(ROOT).to_string();
        match self.lookup(&to_parent) {
            None => return Err(TreeError::ParentMissing(to)),
            Some(parent) if !parent.is_directory() => {
                return Err(TreeError::NotADirectory(to_parent))
            }
            Some(_) => {}
        }

        // Step 2: detach, re-key, reattach
        let from_parent = path::parent_of(&from).unwrap_or(ROOT).to_string();
        let mut node = self
            .lookup_mut(&from_parent)
            .and_then(FileNode::children_mut)
            .and_then(|siblings| siblings.remove(path::file_name(&from)))
            .ok_or_else(|| TreeError::NotFound(from.clone()))?;
        node.reprefix(&from, &to);
        let moved = node.subtree_len();

        if let Err(err) = self.attach(node.clone()) {
            // Destination vanished between validation and attach; put the subtree back
            warn!(error = %err, "Rename reattach failed, restoring source");
            node.reprefix(&to, &from);
            self.attach(node)?;
            return Err(err);
        }
        info!(moved, "Renamed subtree");
        self.node(&to)
    }

    /// Immediate children of a directory, in insertion order
    pub fn list(&self, path: &str) -> Result<Vec<&FileNode>, TreeError> {
        let normalized = path::normalize(path)?;
        let node = self.node(&normalized)?;
        if !node.is_directory() {
            return Err(TreeError::NotADirectory(normalized));
        }
        Ok(node.children().collect())
    }

    /// File content as 1-based `(line number, text)` pairs
    pub fn view_with_line_numbers(&self, path: &str) -> Result<Vec<(usize, &str)>, TreeError> {
        let normalized = path::normalize(path)?;
        let content = self
            .node(&normalized)?
            .content()
            .ok_or(TreeError::NotAFile(normalized))?;
        Ok(content
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .collect())
    }

    /// Lazy depth-first sequence of `(path, content)` for every file
    ///
    /// Each call starts a fresh traversal.
    pub fn files(&self) -> Files<'_> {
        Files::new(&self.root)
    }

    /// Total number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.root.subtree_len()
    }

    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    fn touch(&mut self) {
        self.generation += 1;
    }

    fn lookup(&self, normalized: &str) -> Option<&FileNode> {
        let mut node = &self.root;
        for segment in path::segments(normalized) {
            node = node.child(segment)?;
        }
        Some(node)
    }

    fn lookup_mut(&mut self, normalized: &str) -> Option<&mut FileNode> {
        let mut node = &mut self.root;
        for segment in path::segments(normalized) {
            node = node.child_mut(segment)?;
        }
        Some(node)
    }

    fn node(&self, normalized: &str) -> Result<&FileNode, TreeError> {
        self.lookup(normalized)
            .ok_or_else(|| TreeError::NotFound(normalized.to_string()))
    }

    /// Insert a node under its (existing) parent directory
    fn attach(&mut self, node: FileNode) -> Result<(), TreeError> {
        let normalized = node.path().to_string();
        let parent = path::parent_of(&normalized)
            .ok_or_else(|| TreeError::AlreadyExists(ROOT.to_string()))?;
        let siblings = match self.lookup_mut(parent) {
            None => return Err(TreeError::ParentMissing(normalized)),
            Some(parent_node) => parent_node
                .children_mut()
                .ok_or_else(|| TreeError::NotADirectory(parent.to_string()))?,
        };
        let name = path::file_name(&normalized);
        if siblings.contains_key(name) {
            return Err(TreeError::AlreadyExists(normalized));
        }
        siblings.insert(name.to_string(), node);
        self.touch();
        Ok(())
    }

    /// Fail if any existing strict ancestor of `normalized` is a file
    fn check_ancestors(&self, normalized: &str) -> Result<(), TreeError> {
        let mut node = &self.root;
        let mut current = ROOT.to_string();
        let segments: Vec<&str> = path::segments(normalized).collect();
        for segment in segments.iter().take(segments.len().saturating_sub(1)) {
            current = path::join(&current, segment);
            match node.child(segment) {
                None => return Ok(()),
                Some(child) if child.is_directory() => node = child,
                Some(_) => return Err(TreeError::NotADirectory(current)),
            }
        }
        Ok(())
    }

    /// mkdir -p; returns how many directories were created
    fn ensure_directories(&mut self, dir: &str) -> Result<usize, TreeError> {
        let mut created = 0;
        let mut node = &mut self.root;
        let mut current = ROOT.to_string();
        for segment in path::segments(dir) {
            let next = path::join(&current, segment);
            let children = node
                .children_mut()
                .ok_or_else(|| TreeError::NotADirectory(current.clone()))?;
            let mut inserted = false;
            let child = children.entry(segment.to_string()).or_insert_with(|| {
                inserted = true;
                FileNode::new_directory(next.clone())
            });
            if inserted {
                created += 1;
            }
            if !child.is_directory() {
                return Err(TreeError::NotADirectory(next));
            }
            node = child;
            current = next;
        }
        Ok(created)
    }
}
