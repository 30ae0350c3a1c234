//! Module Transformer
//!
//! Compiles one JSX/TSX/TS source file into plain ES module code: JSX is
//! lowered to `createElement` calls and TypeScript-only syntax is stripped,
//! including imports that only bring in types. Other import and export
//! statements pass through unchanged; their specifiers are reported with byte
//! spans so the preview assembler can rewrite them.

mod emit;
mod jsx;

use crate::error::AssemblyError;
use crate::tree::path;
use emit::Emitter;
use std::ops::Range;
use tracing::{debug, instrument};
use tree_sitter::{Node, Parser, Tree};

/// Extensions the transformer accepts
pub const SOURCE_EXTENSIONS: &[&str] = &["jsx", "tsx", "js", "ts", "mjs"];

/// Local names bound by the injected runtime import
pub const JSX_FACTORY: &str = "__jsx";
pub const JSX_FRAGMENT: &str = "__Fragment";

/// Whether a tree path is transformable source
pub fn is_source_path(file_path: &str) -> bool {
    path::extension(file_path).is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Whether imports in this file may be type-only without saying so
fn is_typescript(file_path: &str) -> bool {
    matches!(path::extension(file_path), Some("ts" | "tsx"))
}

/// How a module refers to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import ... from "x"` or `import "x"`
    Static,
    /// `export ... from "x"`
    ReExport,
    /// `import("x")` with a string literal
    Dynamic,
}

/// An import specifier found in transformed code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    pub specifier: String,
    /// Byte span of the quoted string literal in [`TransformedModule::code`]
    pub span: Range<usize>,
    /// Span of the whole statement (static imports/re-exports only)
    pub statement: Option<Range<usize>>,
    pub kind: ImportKind,
}

/// Result of transforming one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedModule {
    pub path: String,
    pub code: String,
    pub imports: Vec<ImportRef>,
    /// Whether JSX was lowered (and the runtime import injected)
    pub has_jsx: bool,
}

/// Stateless JSX/TSX compiler
#[derive(Debug, Clone, Default)]
pub struct ModuleTransformer;

impl ModuleTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Compile one source file
    ///
    /// Fails with [`AssemblyError::SyntaxError`] (1-based line and column) if
    /// the content does not parse.
    #[instrument(skip(self, content), fields(path = %file_path, bytes = content.len()))]
    pub fn transform(
        &self,
        file_path: &str,
        content: &str,
    ) -> Result<TransformedModule, AssemblyError> {
        let tree = parse(file_path, content)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(syntax_error(file_path, content, root));
        }

        let mut emitter = Emitter::new(content);
        if is_typescript(file_path) {
            emitter.elide_type_only_bindings(root);
        }
        emitter.emit_program(root);
        let (code, imports, has_jsx) = emitter.finish();

        debug!(
            imports = imports.len(),
            has_jsx,
            out_bytes = code.len(),
            "Transformed module"
        );
        Ok(TransformedModule {
            path: file_path.to_string(),
            code,
            imports,
            has_jsx,
        })
    }
}

fn parse(file_path: &str, content: &str) -> Result<Tree, AssemblyError> {
    // Plain .ts uses the non-JSX grammar so `<T>expr` assertions parse
    let language: tree_sitter::Language = if path::extension(file_path) == Some("ts") {
        tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
    } else {
        tree_sitter_typescript::LANGUAGE_TSX.into()
    };

    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| AssemblyError::Parser(e.to_string()))?;
    parser
        .parse(content, None)
        .ok_or_else(|| AssemblyError::Parser(format!("parsing {} was cancelled", file_path)))
}

/// Locate the first ERROR or MISSING node and describe it
fn syntax_error(file_path: &str, content: &str, root: Node<'_>) -> AssemblyError {
    let offending = first_error(root).unwrap_or(root);
    let position = offending.start_position();
    let message = if offending.is_missing() {
        format!("expected `{}`", offending.kind())
    } else {
        let text = &content[offending.start_byte()..offending.end_byte()];
        let snippet: String = text.trim().chars().take(24).collect();
        if snippet.is_empty() {
            "unexpected end of input".to_string()
        } else {
            format!("unexpected `{}`", snippet)
        }
    };
    AssemblyError::SyntaxError {
        path: file_path.to_string(),
        line: position.row + 1,
        column: position.column + 1,
        message,
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
