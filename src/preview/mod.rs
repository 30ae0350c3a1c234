//! Preview Assembler
//!
//! Turns the current tree into a self-contained HTML document: every module
//! reachable from the entry is transformed, its local imports are rewritten to
//! import-map keys, and its code is embedded as a `data:` URL handle. Bare
//! packages map to CDN URLs. Stylesheets imported by modules are inlined.
//!
//! Assembly either produces a complete [`PreviewArtifact`] or fails with one
//! [`AssemblyError`]; there is no partial document.

mod document;
pub mod entry;
pub mod imports;

pub use document::Stylesheet;

use crate::config::PreviewConfig;
use crate::error::AssemblyError;
use crate::transform::{is_source_path, ModuleTransformer, TransformedModule};
use crate::tree::FileTree;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use imports::Specifier;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Range;
use tracing::{debug, info, instrument, warn};

/// Packages the document and the JSX runtime import: (specifier, package, subpath)
const RUNTIME_SPECIFIERS: &[(&str, &str, &str)] = &[
    ("react", "react", ""),
    ("react-dom/client", "react-dom", "/client"),
];

/// Browser import map (`<script type="importmap">`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportMap {
    pub imports: BTreeMap<String, String>,
}

impl ImportMap {
    pub fn get(&self, specifier: &str) -> Option<&str> {
        self.imports.get(specifier).map(String::as_str)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{\"imports\":{}}".to_string())
    }
}

/// One linked module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewModule {
    /// Tree path of the source file
    pub path: String,
    /// Import-map key other modules import it by
    pub key: String,
    /// Transformed code with local specifiers rewritten
    pub code: String,
}

/// Everything the rendering collaborator needs
#[derive(Debug, Clone)]
pub struct PreviewArtifact {
    /// Complete HTML document
    pub document: String,
    pub import_map: ImportMap,
    /// Tree path of the entry module
    pub entry: String,
    /// Linked modules, dependencies before their importers
    pub modules: Vec<PreviewModule>,
    pub styles: Vec<Stylesheet>,
    /// Failures in source files the entry never reaches
    pub diagnostics: Vec<AssemblyError>,
    /// BLAKE3 hex digest of the file set
    pub fingerprint: String,
}

impl PreviewArtifact {
    pub fn module(&self, path: &str) -> Option<&PreviewModule> {
        self.modules.iter().find(|m| m.path == path)
    }
}

/// Builds [`PreviewArtifact`]s from trees
#[derive(Debug, Clone, Default)]
pub struct PreviewAssembler {
    config: PreviewConfig,
    transformer: ModuleTransformer,
}

impl PreviewAssembler {
    pub fn new(config: PreviewConfig) -> Self {
        Self {
            config,
            transformer: ModuleTransformer::new(),
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Assemble a preview of `tree`
    #[instrument(skip(self, tree), fields(files = tree.file_count()))]
    pub fn assemble(&self, tree: &FileTree) -> Result<PreviewArtifact, AssemblyError> {
        // Step 1: Resolve the entry point
        let entry = entry::find_entry(tree, &self.config.entry_candidates)?;

        // Step 2: Link everything reachable from the entry
        let mut linker = Linker::new(self, tree);
        linker.visit(&entry)?;

        // Step 3: Check the unreachable sources so their failures are reported
        let diagnostics = linker.check_unreachable();

        // Step 4: Build the import map and the document
        let mut import_map = ImportMap::default();
        for (specifier, package, subpath) in RUNTIME_SPECIFIERS {
            import_map.imports.insert(
                specifier.to_string(),
                imports::package_url(&self.config.cdn_base, &self.config.packages, package, subpath),
            );
        }
        import_map.imports.extend(linker.packages);
        for module in &linker.modules {
            import_map
                .imports
                .insert(module.key.clone(), data_url(&module.code));
        }

        let import_map_json = import_map.to_json();
        let entry_key = self.key_for(&entry);
        let document = document::render(&document::DocumentParts {
            config: &self.config,
            import_map_json: &import_map_json,
            styles: &linker.styles,
            entry_key: &entry_key,
            entry_path: &entry,
        });

        info!(
            entry = %entry,
            modules = linker.modules.len(),
            styles = linker.styles.len(),
            skipped = diagnostics.len(),
            "Preview assembled"
        );

        Ok(PreviewArtifact {
            document,
            import_map,
            entry,
            modules: linker.modules,
            styles: linker.styles,
            diagnostics,
            fingerprint: fingerprint(tree),
        })
    }

    /// Canonical import-map key of a tree path
    pub fn key_for(&self, file_path: &str) -> String {
        format!(
            "{}{}",
            self.config.alias_prefix,
            file_path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Depth-first module linker
struct Linker<'a> {
    assembler: &'a PreviewAssembler,
    tree: &'a FileTree,
    state: HashMap<String, Visit>,
    modules: Vec<PreviewModule>,
    styles: Vec<Stylesheet>,
    packages: BTreeMap<String, String>,
}

/// A pending rewrite of the transformed code
struct Edit {
    range: Range<usize>,
    replacement: String,
}

impl<'a> Linker<'a> {
    fn new(assembler: &'a PreviewAssembler, tree: &'a FileTree) -> Self {
        Self {
            assembler,
            tree,
            state: HashMap::new(),
            modules: Vec::new(),
            styles: Vec::new(),
            packages: BTreeMap::new(),
        }
    }

    fn transform(&self, file_path: &str) -> Result<TransformedModule, AssemblyError> {
        let content = self
            .tree
            .read(file_path)
            .ok()
            .and_then(|node| node.content())
            .unwrap_or_default();
        self.assembler.transformer.transform(file_path, content)
    }

    fn visit(&mut self, file_path: &str) -> Result<(), AssemblyError> {
        if self.state.contains_key(file_path) {
            return Ok(());
        }
        self.state.insert(file_path.to_string(), Visit::InProgress);

        let module = self.transform(file_path)?;
        let mut edits = Vec::new();

        for import in &module.imports {
            let alias_prefix = &self.assembler.config.alias_prefix;
            match imports::classify(file_path, &import.specifier, alias_prefix) {
                Specifier::Url => {}
                Specifier::Package { name, subpath } => {
                    let config = &self.assembler.config;
                    let url =
                        imports::package_url(&config.cdn_base, &config.packages, &name, &subpath);
                    if !config.packages.contains_key(&name) {
                        debug!(package = %name, "Unpinned package");
                    }
                    self.packages.insert(import.specifier.clone(), url);
                }
                Specifier::Local(base) => {
                    let resolved = base.and_then(|base| self.resolve(&base));
                    let Some(target) = resolved else {
                        return Err(AssemblyError::UnresolvedImport {
                            importer: file_path.to_string(),
                            specifier: import.specifier.clone(),
                        });
                    };

                    if imports::is_stylesheet(&target) {
                        self.add_stylesheet(&target);
                        edits.push(match &import.statement {
                            Some(statement) => Edit {
                                range: statement.clone(),
                                replacement: String::new(),
                            },
                            // import("./x.css") resolves to an empty module
                            None => Edit {
                                range: import.span.clone(),
                                replacement: "\"data:text/javascript,\"".to_string(),
                            },
                        });
                        continue;
                    }

                    // Back edges of a cycle only need the key; the browser links them
                    if self.state.get(&target) == Some(&Visit::InProgress) {
                        debug!(
                            importer = %file_path,
                            target = %target,
                            kind = ?import.kind,
                            "Import cycle"
                        );
                    } else {
                        self.visit(&target)?;
                    }
                    edits.push(Edit {
                        range: import.span.clone(),
                        replacement: js_string(&self.assembler.key_for(&target)),
                    });
                }
            }
        }

        let code = apply_edits(&module.code, edits);
        debug!(path = %file_path, bytes = code.len(), "Module linked");
        self.modules.push(PreviewModule {
            path: file_path.to_string(),
            key: self.assembler.key_for(file_path),
            code,
        });
        self.state.insert(file_path.to_string(), Visit::Done);
        Ok(())
    }

    /// Local resolution: source modules probe extensions, stylesheets must match exactly
    fn resolve(&self, base: &str) -> Option<String> {
        imports::resolve_local(self.tree, base)
            .filter(|target| is_source_path(target) || imports::is_stylesheet(target))
    }

    fn add_stylesheet(&mut self, css_path: &str) {
        if self.styles.iter().any(|s| s.path == css_path) {
            return;
        }
        let content = self
            .tree
            .read(css_path)
            .ok()
            .and_then(|node| node.content())
            .unwrap_or_default();
        self.styles.push(Stylesheet {
            path: css_path.to_string(),
            content: content.to_string(),
        });
    }

    /// Transform source files the entry never reached; failures become diagnostics
    fn check_unreachable(&self) -> Vec<AssemblyError> {
        let reached: HashSet<&str> = self.state.keys().map(String::as_str).collect();
        let mut diagnostics = Vec::new();
        for (file_path, _) in self.tree.files() {
            if !is_source_path(file_path) || reached.contains(file_path) {
                continue;
            }
            if let Err(err) = self.transform(file_path) {
                warn!(path = %file_path, error = %err, "Skipping unreachable module");
                diagnostics.push(err);
            }
        }
        diagnostics
    }
}

/// Apply non-overlapping edits, back to front so earlier ranges stay valid
fn apply_edits(code: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|edit| std::cmp::Reverse(edit.range.start));
    let mut out = code.to_string();
    for edit in edits {
        out.replace_range(edit.range, &edit.replacement);
    }
    out
}

/// Self-contained module handle
pub fn data_url(code: &str) -> String {
    format!("data:text/javascript;base64,{}", STANDARD.encode(code))
}

/// BLAKE3 digest over `(path, content)` pairs in path order
pub fn fingerprint(tree: &FileTree) -> String {
    let mut files: Vec<(&str, &str)> = tree.files().collect();
    files.sort_unstable_by_key(|(file_path, _)| *file_path);

    let mut hasher = blake3::Hasher::new();
    for (file_path, content) in files {
        hasher.update(file_path.as_bytes());
        hasher.update(&[0]);
        hasher.update(&(content.len() as u64).to_le_bytes());
        hasher.update(content.as_bytes());
    }
    hex::encode(hasher.finalize().as_bytes())
}

fn js_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("{:?}", text))
}
