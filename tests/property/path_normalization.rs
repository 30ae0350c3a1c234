//! Property-based tests for path normalization

use proptest::prelude::*;
use sketchvfs::tree::path::normalize;

fn path_strategy() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        "[a-zA-Z0-9_-]{1,8}",
        Just(".".to_string()),
        Just("..".to_string()),
        Just(String::new()),
        "[a-z]{1,4}\\.(jsx|tsx|css)",
        Just("e\u{301}".to_string()),
    ];
    (any::<bool>(), prop::collection::vec(segment, 0..8), any::<bool>()).prop_map(
        |(leading, segments, trailing)| {
            let mut path = segments.join("/");
            if leading {
                path.insert(0, '/');
            }
            if trailing {
                path.push('/');
            }
            path
        },
    )
}

proptest! {
    /// Normalizing a normalized path changes nothing
    #[test]
    fn prop_normalize_is_idempotent(path in path_strategy()) {
        if let Ok(once) = normalize(&path) {
            let twice = normalize(&once).unwrap();
            prop_assert_eq!(&twice, &once);
        }
    }

    /// Every normalized path is rooted and has no empty, `.`, or `..` segments
    #[test]
    fn prop_normalized_paths_are_canonical(path in path_strategy()) {
        if let Ok(normalized) = normalize(&path) {
            prop_assert!(normalized.starts_with('/'));
            prop_assert!(normalized == "/" || !normalized.ends_with('/'));
            if normalized != "/" {
                for segment in normalized[1..].split('/') {
                    prop_assert!(!segment.is_empty() && segment != "." && segment != "..");
                }
            }
        }
    }
}
