//! Integration tests for FileTree structure operations

use sketchvfs::error::TreeError;
use sketchvfs::tree::{FileTree, NodeKind};

fn tree_with_nested_file() -> FileTree {
    let mut tree = FileTree::new();
    tree.create_with_parents("/a/b/c.jsx", Some("export default 1;"))
        .unwrap();
    tree
}

/// Creating a deep file from an empty tree brings its directories with it
#[test]
fn test_create_with_parents_materializes_directories() {
    let tree = tree_with_nested_file();

    assert_eq!(tree.read("/a").unwrap().kind(), NodeKind::Directory);
    assert_eq!(tree.read("/a/b").unwrap().kind(), NodeKind::Directory);
    let file = tree.read("/a/b/c.jsx").unwrap();
    assert_eq!(file.kind(), NodeKind::File);
    assert_eq!(file.content(), Some("export default 1;"));
}

/// Deleting a directory removes every descendant
#[test]
fn test_delete_directory_removes_descendants() {
    let mut tree = tree_with_nested_file();
    tree.delete("/a").unwrap();

    assert_eq!(
        tree.read("/a/b/c.jsx").unwrap_err(),
        TreeError::NotFound("/a/b/c.jsx".to_string())
    );
    assert!(!tree.exists("/a/b"));
    assert_eq!(tree.node_count(), 1);
}

/// Renaming a directory re-keys its subtree
#[test]
fn test_rename_moves_subtree() {
    let mut tree = tree_with_nested_file();
    tree.rename("/a", "/z").unwrap();

    assert!(tree.exists("/z/b/c.jsx"));
    assert!(!tree.exists("/a/b/c.jsx"));
    assert_eq!(
        tree.read("/z/b/c.jsx").unwrap().content(),
        Some("export default 1;")
    );
    assert_eq!(tree.read("/z/b/c.jsx").unwrap().path(), "/z/b/c.jsx");
}

#[test]
fn test_paths_are_normalized_on_every_operation() {
    let mut tree = FileTree::new();
    tree.create("src", NodeKind::Directory, None).unwrap();
    tree.create("/src//./App.jsx", NodeKind::File, Some("x"))
        .unwrap();

    assert!(tree.exists("/src/App.jsx"));
    assert!(tree.exists("src/App.jsx/"));
    assert_eq!(tree.list("/src/").unwrap().len(), 1);
    assert!(matches!(
        tree.read("/../etc"),
        Err(TreeError::InvalidPath(_))
    ));
}

#[test]
fn test_failed_operations_do_not_mutate() {
    let mut tree = tree_with_nested_file();
    let generation = tree.generation();

    assert_eq!(tree.delete("/"), Err(TreeError::RootDeletion));
    assert!(matches!(
        tree.create("/missing/x.js", NodeKind::File, None),
        Err(TreeError::ParentMissing(_))
    ));
    assert!(matches!(
        tree.create_with_parents("/a/b/c.jsx", Some("again")),
        Err(TreeError::AlreadyExists(_))
    ));
    assert!(matches!(tree.update("/a", "text"), Err(TreeError::NotAFile(_))));
    assert!(matches!(
        tree.list("/a/b/c.jsx"),
        Err(TreeError::NotADirectory(_))
    ));

    assert_eq!(tree.generation(), generation);
    assert_eq!(
        tree.read("/a/b/c.jsx").unwrap().content(),
        Some("export default 1;")
    );
}

#[test]
fn test_files_traversal_is_depth_first() {
    let mut tree = FileTree::new();
    tree.create_with_parents("/App.jsx", Some("app")).unwrap();
    tree.create_with_parents("/components/Button.jsx", Some("button"))
        .unwrap();
    tree.create_with_parents("/components/ui/Icon.jsx", Some("icon"))
        .unwrap();
    tree.create_with_parents("/styles.css", Some("css")).unwrap();

    let paths: Vec<&str> = tree.files().map(|(path, _)| path).collect();
    assert_eq!(
        paths,
        vec![
            "/App.jsx",
            "/components/Button.jsx",
            "/components/ui/Icon.jsx",
            "/styles.css"
        ]
    );
    assert_eq!(tree.file_count(), 4);
}
