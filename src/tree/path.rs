//! Path canonicalization and normalization utilities

use crate::error::TreeError;
use unicode_normalization::UnicodeNormalization;

/// Root path of every tree
pub const ROOT: &str = "/";

/// Canonicalize a path string into an absolute tree path
///
/// This function:
/// 1. Rejects embedded NUL bytes
/// 2. Normalizes Unicode to NFC
/// 3. Collapses repeated separators and drops `.` segments
/// 4. Resolves `..` against the accumulated segments (escaping root is an error)
/// 5. Prepends `/` and removes trailing slashes (except root)
pub fn normalize(path: &str) -> Result<String, TreeError> {
    if path.contains('\0') {
        return Err(TreeError::InvalidPath(format!(
            "{:?} contains a NUL byte",
            path
        )));
    }

    // Normalize Unicode to NFC (Canonical Composition)
    let nfc: String = path.nfc().collect();

    let mut stack: Vec<&str> = Vec::new();
    for segment in nfc.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                if stack.pop().is_none() {
                    return Err(TreeError::InvalidPath(format!("{} escapes root", path)));
                }
            }
            other => stack.push(other),
        }
    }

    if stack.is_empty() {
        return Ok(ROOT.to_string());
    }

    let mut normalized = String::with_capacity(nfc.len() + 1);
    for segment in stack {
        normalized.push('/');
        normalized.push_str(segment);
    }
    Ok(normalized)
}

/// Parent of a normalized path (None for root)
pub fn parent_of(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some(ROOT),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

/// Final segment of a normalized path (empty for root)
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}

/// Extension of the final segment, without the dot
pub fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx + 1..]),
    }
}

/// Join a child name onto a normalized directory path
pub fn join(dir: &str, name: &str) -> String {
    if dir == ROOT {
        format!("/{}", name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Segments of a normalized path, root excluded
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Whether `ancestor` is a strict ancestor of `path`
pub fn is_ancestor(ancestor: &str, path: &str) -> bool {
    if ancestor == ROOT {
        return path != ROOT;
    }
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

/// Rewrite the `old` prefix of `path` to `new`
///
/// `path` must be `old` itself or one of its descendants, and neither
/// `old` nor `new` may be root.
pub fn reprefix(path: &str, old: &str, new: &str) -> String {
    if path == old {
        return new.to_string();
    }
    format!("{}{}", new, &path[old.len()..])
}
