//! sketchvfs: In-Memory Project Trees with Live Preview
//!
//! A virtual file tree edited through patches and tool-style intents, a
//! JSX/TSX to ES module transformer, and a preview assembler that links the
//! tree into a single HTML document driven by an import map.

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod intent;
pub mod logging;
pub mod patch;
pub mod preview;
pub mod session;
pub mod store;
pub mod transform;
pub mod tree;

pub use error::{ApiError, AssemblyError, PatchError, StorageError, TreeError};
pub use intent::{EditIntent, IntentOutcome};
pub use patch::Occurrences;
pub use preview::{PreviewArtifact, PreviewAssembler};
pub use session::ProjectSession;
pub use store::{SnapshotStore, TreeSnapshot};
pub use transform::ModuleTransformer;
pub use tree::{FileNode, FileTree, NodeKind};
