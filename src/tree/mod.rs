//! In-memory project tree
//!
//! A single-owner hierarchy of directories and files keyed by normalized
//! absolute paths. Directories own their children, indexed by name in
//! insertion order; there are no parent back-pointers.

pub mod file_tree;
pub mod node;
pub mod path;
pub mod walker;

pub use file_tree::FileTree;
pub use node::{FileNode, NodeKind};
pub use walker::{Files, Walker, WalkerConfig};
