//! Integration tests for patch-based editing

use sketchvfs::error::PatchError;
use sketchvfs::patch::Occurrences;
use sketchvfs::tree::FileTree;

fn tree_with(path: &str, content: &str) -> FileTree {
    let mut tree = FileTree::new();
    tree.create_with_parents(path, Some(content)).unwrap();
    tree
}

fn content_of(tree: &FileTree, path: &str) -> String {
    tree.read(path).unwrap().content().unwrap().to_string()
}

/// A single match is replaced and nothing else changes
#[test]
fn test_replace_single_occurrence() {
    let mut tree = tree_with("/f.jsx", "const a = X;\nconst b = 2;\n");
    tree.replace_in_file("/f.jsx", "X", "Y", Occurrences::default())
        .unwrap();
    assert_eq!(content_of(&tree, "/f.jsx"), "const a = Y;\nconst b = 2;\n");
}

/// Two matches without an occurrence count are refused
#[test]
fn test_replace_refuses_ambiguous_match() {
    let mut tree = tree_with("/f.jsx", "X + X");
    let generation = tree.generation();

    let err = tree
        .replace_in_file("/f.jsx", "X", "Y", Occurrences::default())
        .unwrap_err();
    assert_eq!(
        err,
        PatchError::AmbiguousMatch {
            path: "/f.jsx".to_string(),
            count: 2
        }
    );
    assert_eq!(content_of(&tree, "/f.jsx"), "X + X");
    assert_eq!(tree.generation(), generation);
}

#[test]
fn test_replace_with_explicit_counts() {
    let mut tree = tree_with("/f.jsx", "X + X");
    tree.replace_in_file("/f.jsx", "X", "Y", Occurrences::Exactly(2))
        .unwrap();
    assert_eq!(content_of(&tree, "/f.jsx"), "Y + Y");

    tree.replace_in_file("/f.jsx", "Y", "Z", Occurrences::All)
        .unwrap();
    assert_eq!(content_of(&tree, "/f.jsx"), "Z + Z");

    assert!(matches!(
        tree.replace_in_file("/f.jsx", "Z", "W", Occurrences::Exactly(3)),
        Err(PatchError::OccurrenceMismatch {
            expected: 3,
            found: 2,
            ..
        })
    ));
    assert!(matches!(
        tree.replace_in_file("/f.jsx", "Q", "W", Occurrences::All),
        Err(PatchError::NotFound { .. })
    ));
}

/// Inserting at N+1 appends; N+2 is out of range
#[test]
fn test_insert_at_line_bounds() {
    let mut tree = tree_with("/f.jsx", "one\ntwo\nthree\n");

    tree.insert_in_file("/f.jsx", 4, "last").unwrap();
    assert_eq!(content_of(&tree, "/f.jsx"), "one\ntwo\nthree\nlast\n");

    let err = tree.insert_in_file("/f.jsx", 6, "x").unwrap_err();
    assert_eq!(
        err,
        PatchError::OutOfRange {
            path: "/f.jsx".to_string(),
            line: 6,
            max: 5
        }
    );
}

#[test]
fn test_patches_on_directories_and_missing_files_fail() {
    let mut tree = tree_with("/src/App.jsx", "x");
    assert!(matches!(
        tree.replace_in_file("/src", "x", "y", Occurrences::default()),
        Err(PatchError::Tree(_))
    ));
    assert!(matches!(
        tree.insert_in_file("/missing.jsx", 1, "x"),
        Err(PatchError::Tree(_))
    ));
}
