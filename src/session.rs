//! Project Sessions
//!
//! One project tree behind a single coarse lock. Edits take the write lock;
//! views, snapshots, and previews take the read lock. The tree's generation
//! counter tells callers when a batch of edits has changed anything.

use crate::error::{ApiError, AssemblyError};
use crate::intent::{self, EditIntent, IntentOutcome};
use crate::preview::{PreviewArtifact, PreviewAssembler};
use crate::store::{self, SnapshotStore, TreeSnapshot};
use crate::tree::FileTree;
use parking_lot::RwLock;
use tracing::{debug, info, instrument};

/// A live project: id plus its tree
#[derive(Debug)]
pub struct ProjectSession {
    id: String,
    tree: RwLock<FileTree>,
}

impl ProjectSession {
    /// Start a session on an empty tree
    pub fn new(id: impl Into<String>) -> Self {
        Self::from_tree(id, FileTree::new())
    }

    pub fn from_tree(id: impl Into<String>, tree: FileTree) -> Self {
        Self {
            id: id.into(),
            tree: RwLock::new(tree),
        }
    }

    /// Resume the project stored under `id`, or start an empty one
    #[instrument(skip(store))]
    pub fn open(store: &dyn SnapshotStore, id: &str) -> Result<Self, ApiError> {
        match store.load(id)? {
            Some(snapshot) => {
                let tree = store::deserialize(&snapshot)?;
                info!(files = tree.file_count(), "Session restored");
                Ok(Self::from_tree(id, tree))
            }
            None => {
                debug!("No snapshot, starting empty session");
                Ok(Self::new(id))
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn generation(&self) -> u64 {
        self.tree.read().generation()
    }

    /// Run `f` against the tree under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&FileTree) -> R) -> R {
        f(&self.tree.read())
    }

    /// Apply one intent; `view` only takes the read lock
    pub fn apply(&self, intent: &EditIntent) -> Result<IntentOutcome, ApiError> {
        if intent.is_read_only() {
            return intent::view(&self.tree.read(), intent);
        }
        intent::apply(&mut self.tree.write(), intent)
    }

    /// Apply intents in order under one write lock
    ///
    /// Stops at the first failure; intents applied before it stay applied.
    #[instrument(skip(self, intents), fields(id = %self.id, count = intents.len()))]
    pub fn apply_all(&self, intents: &[EditIntent]) -> Result<Vec<IntentOutcome>, ApiError> {
        let mut tree = self.tree.write();
        let before = tree.generation();
        let outcomes = intents
            .iter()
            .map(|intent| intent::apply(&mut tree, intent))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(changes = tree.generation() - before, "Batch applied");
        Ok(outcomes)
    }

    pub fn snapshot(&self) -> TreeSnapshot {
        store::serialize(&self.tree.read())
    }

    /// Persist the current tree under the session id
    pub fn save(&self, store: &dyn SnapshotStore) -> Result<(), ApiError> {
        let snapshot = self.snapshot();
        store.save(&self.id, &snapshot)?;
        Ok(())
    }

    pub fn preview(&self, assembler: &PreviewAssembler) -> Result<PreviewArtifact, AssemblyError> {
        assembler.assemble(&self.tree.read())
    }
}
