//! Property-based tests for snapshot round-trips

use proptest::prelude::*;
use sketchvfs::store;
use sketchvfs::tree::FileTree;

/// Random file paths up to three directories deep with small contents
fn files_strategy() -> impl Strategy<Value = Vec<(Vec<String>, String)>> {
    prop::collection::vec(
        (
            prop::collection::vec("[a-d]{1,2}", 1..4),
            "[ -~\n]{0,24}",
        ),
        0..12,
    )
}

fn build_tree(files: &[(Vec<String>, String)]) -> FileTree {
    let mut tree = FileTree::new();
    for (segments, content) in files {
        let path = format!("/{}", segments.join("/"));
        // Collisions with existing files or directories are skipped
        let _ = tree.create_with_parents(&path, Some(content.as_str()));
    }
    tree
}

proptest! {
    /// deserialize(serialize(T)) has exactly T's (path, kind, content) tuples
    #[test]
    fn prop_snapshot_round_trip(files in files_strategy()) {
        let tree = build_tree(&files);
        let snapshot = store::serialize(&tree);
        let restored = store::deserialize(&snapshot).unwrap();

        // Both sides list entries depth-first in insertion order
        prop_assert_eq!(snapshot.entries(), store::serialize(&restored).entries());
        prop_assert_eq!(restored.node_count(), tree.node_count());
    }

    /// The JSON form decodes to the same snapshot
    #[test]
    fn prop_json_round_trip(files in files_strategy()) {
        let snapshot = store::serialize(&build_tree(&files));
        let json = store::to_json(&snapshot).unwrap();
        prop_assert_eq!(store::from_json(&json).unwrap(), snapshot);
    }
}
