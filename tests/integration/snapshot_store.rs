//! Integration tests for snapshots and the snapshot stores

use sketchvfs::error::TreeError;
use sketchvfs::store::{
    self, MemorySnapshotStore, SledSnapshotStore, SnapshotNode, SnapshotStore, TreeSnapshot,
};
use sketchvfs::tree::{FileTree, NodeKind};
use tempfile::TempDir;

fn project_tree() -> FileTree {
    let mut tree = FileTree::new();
    tree.create_with_parents("/App.jsx", Some("export default () => null;\n"))
        .unwrap();
    tree.create_with_parents("/components/Button.jsx", Some(""))
        .unwrap();
    tree.create_dir_all("/assets/empty").unwrap();
    tree
}

#[test]
fn test_round_trip_keeps_every_entry() {
    let tree = project_tree();
    let restored = store::deserialize(&store::serialize(&tree)).unwrap();

    let before: Vec<_> = store::serialize(&tree).entries();
    let after: Vec<_> = store::serialize(&restored).entries();
    assert_eq!(before, after);
    assert!(restored.read("/assets/empty").unwrap().is_directory());
    assert_eq!(
        restored.read("/components/Button.jsx").unwrap().content(),
        Some("")
    );
}

#[test]
fn test_sled_store_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let snapshot = store::serialize(&project_tree());
    {
        let store = SledSnapshotStore::new(dir.path()).unwrap();
        store.save("demo", &snapshot).unwrap();
    }

    let store = SledSnapshotStore::new(dir.path()).unwrap();
    assert_eq!(store.load("demo").unwrap(), Some(snapshot));
    assert_eq!(store.load("other").unwrap(), None);
    assert_eq!(store.ids().unwrap(), vec!["demo".to_string()]);
}

#[test]
fn test_json_form_is_plain_nested_lists() {
    let json = store::to_json(&store::serialize(&project_tree())).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["root"]["path"], "/");
    assert_eq!(value["root"]["kind"], "directory");
    assert!(value["root"]["children"].is_array());
    assert_eq!(value["root"]["children"][0]["path"], "/App.jsx");

    let back = store::from_json(&json).unwrap();
    assert_eq!(back, store::serialize(&project_tree()));
}

#[test]
fn test_malformed_snapshot_is_rejected() {
    let snapshot = TreeSnapshot {
        version: store::SNAPSHOT_VERSION,
        root: SnapshotNode {
            path: "/".to_string(),
            kind: NodeKind::Directory,
            content: None,
            children: Some(vec![SnapshotNode {
                path: "/x.js".to_string(),
                kind: NodeKind::File,
                content: Some("x".to_string()),
                children: Some(Vec::new()),
            }]),
        },
    };
    assert!(matches!(
        store::deserialize(&snapshot),
        Err(TreeError::MalformedSnapshot(_))
    ));
}

#[test]
fn test_memory_store_replaces_snapshot() {
    let store = MemorySnapshotStore::new();
    store.save("p", &store::serialize(&FileTree::new())).unwrap();
    store.save("p", &store::serialize(&project_tree())).unwrap();

    let loaded = store.load("p").unwrap().unwrap();
    assert_eq!(store::deserialize(&loaded).unwrap().file_count(), 2);
}
