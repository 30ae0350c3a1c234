//! Tree traversal and seeding a tree from a real directory

use crate::error::{ApiError, StorageError, TreeError};
use crate::tree::file_tree::FileTree;
use crate::tree::node::FileNode;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Depth-first iterator over `(path, content)` of every file node
///
/// Directories are visited but not yielded; children come in insertion order.
#[derive(Debug)]
pub struct Files<'a> {
    stack: Vec<&'a FileNode>,
}

impl<'a> Files<'a> {
    pub(crate) fn new(root: &'a FileNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for Files<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if let Some(content) = node.content() {
                return Some((node.path(), content));
            }
            let children: Vec<&'a FileNode> = node.children().collect();
            self.stack.extend(children.into_iter().rev());
        }
        None
    }
}

/// Disk import configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false)
    pub follow_symlinks: bool,
    /// Directory or file names to skip (e.g., ".git", "node_modules")
    pub ignore_patterns: Vec<String>,
    /// Skip dot-prefixed entries
    pub skip_hidden: bool,
    /// Files larger than this are skipped (bytes)
    pub max_file_size: u64,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            ignore_patterns: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                "dist".to_string(),
                "target".to_string(),
            ],
            skip_hidden: true,
            max_file_size: 1024 * 1024,
        }
    }
}

/// Seeds a [`FileTree`] from a directory on disk
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Walk the directory and build a tree from its text files
    ///
    /// Non-UTF-8 and oversized files are skipped with a warning.
    pub fn import(&self) -> Result<FileTree, ApiError> {
        let root = dunce::canonicalize(&self.root).map_err(StorageError::IoError)?;
        let mut tree = FileTree::new();

        let walker = WalkDir::new(&root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.should_ignore(entry));

        for entry in walker {
            let entry = entry.map_err(|e| {
                StorageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to walk directory: {}", e),
                ))
            })?;
            if entry.depth() == 0 {
                continue;
            }

            let tree_path = to_tree_path(&root, entry.path())?;
            let file_type = entry.file_type();
            if file_type.is_dir() {
                tree.create_dir_all(&tree_path)?;
            } else if file_type.is_file() {
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                if size > self.config.max_file_size {
                    warn!(path = %tree_path, size, "Skipping oversized file");
                    continue;
                }
                match std::fs::read_to_string(entry.path()) {
                    Ok(content) => {
                        tree.create_with_parents(&tree_path, Some(content.as_str()))?;
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                        warn!(path = %tree_path, "Skipping non-UTF-8 file");
                    }
                    Err(e) => return Err(StorageError::IoError(e).into()),
                }
            } else {
                debug!(path = %tree_path, "Skipping special file");
            }
        }

        info!(
            root = %root.display(),
            files = tree.file_count(),
            nodes = tree.node_count(),
            "Imported directory into tree"
        );
        Ok(tree)
    }

    fn should_ignore(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        if self.config.skip_hidden && name.starts_with('.') {
            return true;
        }
        self.config
            .ignore_patterns
            .iter()
            .any(|pattern| name == pattern.as_str())
    }
}

fn to_tree_path(root: &Path, path: &Path) -> Result<String, TreeError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| TreeError::InvalidPath(path.display().to_string()))?;
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    crate::tree::path::normalize(&joined)
}
