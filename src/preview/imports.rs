//! Import specifier classification and resolution
//!
//! Local specifiers (relative, absolute, or aliased) resolve against the tree
//! with extension and `index` probing. Everything else is a bare package
//! served from the CDN.

use crate::tree::path;
use crate::tree::FileTree;
use std::collections::BTreeMap;

/// Extensions probed for extensionless local specifiers, in order
pub const RESOLVE_EXTENSIONS: &[&str] = &["jsx", "tsx", "js", "ts"];

/// What a specifier refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifier {
    /// A path in the tree (not yet probed); `None` if it escapes the root
    Local(Option<String>),
    /// `name` is `pkg` or `@scope/pkg`; `subpath` keeps its leading `/`
    Package { name: String, subpath: String },
    /// Absolute URL, left untouched
    Url,
}

/// Classify `specifier` as written in `importer`
pub fn classify(importer: &str, specifier: &str, alias_prefix: &str) -> Specifier {
    if is_url(specifier) {
        return Specifier::Url;
    }
    if specifier == "." || specifier == ".." || specifier.starts_with("./") || specifier.starts_with("../") {
        let dir = path::parent_of(importer).unwrap_or(path::ROOT);
        return Specifier::Local(path::normalize(&format!("{}/{}", dir, specifier)).ok());
    }
    if specifier.starts_with('/') {
        return Specifier::Local(path::normalize(specifier).ok());
    }
    if let Some(rest) = specifier.strip_prefix(alias_prefix) {
        return Specifier::Local(path::normalize(rest).ok());
    }

    let (name, subpath) = split_package(specifier);
    Specifier::Package {
        name: name.to_string(),
        subpath: subpath.to_string(),
    }
}

fn is_url(specifier: &str) -> bool {
    ["http://", "https://", "data:", "blob:"]
        .iter()
        .any(|scheme| specifier.starts_with(scheme))
}

/// `@scope/pkg/sub` → (`@scope/pkg`, `/sub`); `pkg/sub` → (`pkg`, `/sub`)
pub fn split_package(specifier: &str) -> (&str, &str) {
    let name_segments = if specifier.starts_with('@') { 2 } else { 1 };
    let mut end = 0;
    for (seen, segment) in specifier.split('/').enumerate() {
        if seen == name_segments {
            break;
        }
        end += segment.len() + usize::from(seen > 0);
    }
    specifier.split_at(end.min(specifier.len()))
}

/// Probe the tree for a local module: exact path, then each extension, then
/// `index.*` inside a directory of that name
pub fn resolve_local(tree: &FileTree, base: &str) -> Option<String> {
    let is_file = |candidate: &str| tree.read(candidate).is_ok_and(|node| node.is_file());

    if is_file(base) {
        return Some(base.to_string());
    }
    for ext in RESOLVE_EXTENSIONS {
        let candidate = format!("{}.{}", base, ext);
        if is_file(&candidate) {
            return Some(candidate);
        }
    }
    for ext in RESOLVE_EXTENSIONS {
        let candidate = path::join(base, &format!("index.{}", ext));
        if is_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// CDN URL for a bare package, pinned when the package table names it
pub fn package_url(
    cdn_base: &str,
    packages: &BTreeMap<String, String>,
    name: &str,
    subpath: &str,
) -> String {
    let cdn = cdn_base.trim_end_matches('/');
    match packages.get(name) {
        Some(version) => format!("{}/{}@{}{}", cdn, name, version, subpath),
        None => format!("{}/{}{}", cdn, name, subpath),
    }
}

/// Whether a resolved path is a stylesheet
pub fn is_stylesheet(file_path: &str) -> bool {
    path::extension(file_path) == Some("css")
}
