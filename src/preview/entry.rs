//! Entry point resolution

use crate::error::AssemblyError;
use crate::tree::FileTree;
use tracing::debug;

/// First candidate that exists as a file, in priority order
pub fn find_entry(tree: &FileTree, candidates: &[String]) -> Result<String, AssemblyError> {
    let found = candidates
        .iter()
        .find(|candidate| tree.read(candidate).is_ok_and(|node| node.is_file()));

    match found {
        Some(entry) => {
            debug!(entry = %entry, "Entry point resolved");
            Ok(entry.clone())
        }
        None => Err(AssemblyError::NoEntryPoint {
            tried: candidates.to_vec(),
        }),
    }
}
