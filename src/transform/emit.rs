//! Source-to-source emission over a tree-sitter syntax tree
//!
//! Output is built by copying the source between child nodes and recursing
//! into children, so untouched code (comments and whitespace included) comes
//! out byte-for-byte. Nodes that only carry TypeScript types emit nothing.
//!
//! Imports follow TypeScript elision: `type` specifiers always go, and in
//! TypeScript sources a binding never read as a value is dropped along with
//! the statement once nothing is left of it.

use super::{ImportKind, ImportRef, JSX_FACTORY, JSX_FRAGMENT};
use std::collections::HashSet;
use tree_sitter::Node;

/// Nodes dropped entirely when stripping types
const TYPE_ONLY_NODES: &[&str] = &[
    "type_annotation",
    "type_parameters",
    "type_arguments",
    "asserts_annotation",
    "type_predicate_annotation",
    "interface_declaration",
    "type_alias_declaration",
    "ambient_declaration",
    "function_signature",
    "abstract_method_signature",
    "index_signature",
    "implements_clause",
    "accessibility_modifier",
    "override_modifier",
];

/// Wrapper expressions whose first named child is the runtime value
const TYPE_WRAPPERS: &[&str] = &["as_expression", "satisfies_expression", "non_null_expression"];

pub(super) struct Emitter<'s> {
    pub(super) src: &'s str,
    pub(super) out: String,
    imports: Vec<ImportRef>,
    /// Node id of the string literal to record as an import
    specifier: Option<(usize, ImportKind)>,
    pub(super) has_jsx: bool,
    /// Names read as values; `None` keeps every non-`type` binding
    value_names: Option<HashSet<&'s str>>,
}

impl<'s> Emitter<'s> {
    pub(super) fn new(src: &'s str) -> Self {
        Self {
            src,
            out: String::with_capacity(src.len() + 128),
            imports: Vec::new(),
            specifier: None,
            has_jsx: false,
            value_names: None,
        }
    }

    /// Drop import bindings that `root` only uses as types
    pub(super) fn elide_type_only_bindings(&mut self, root: Node<'_>) {
        self.value_names = Some(value_names(self.src, root));
    }

    fn is_value(&self, name: &str) -> bool {
        self.value_names
            .as_ref()
            .map_or(true, |names| names.contains(name))
    }

    pub(super) fn emit_program(&mut self, root: Node<'_>) {
        let src = self.src;
        self.out.push_str(&src[..root.start_byte()]);
        self.emit(root);
        self.out.push_str(&src[root.end_byte()..]);
    }

    /// Final code, import references, and whether JSX was lowered
    pub(super) fn finish(self) -> (String, Vec<ImportRef>, bool) {
        if !self.has_jsx {
            return (self.out, self.imports, false);
        }

        let prelude = format!(
            "import {{ createElement as {}, Fragment as {} }} from \"react\";\n",
            JSX_FACTORY, JSX_FRAGMENT
        );
        let shift = prelude.len();
        let imports = self
            .imports
            .into_iter()
            .map(|import| ImportRef {
                span: import.span.start + shift..import.span.end + shift,
                statement: import
                    .statement
                    .map(|s| s.start + shift..s.end + shift),
                ..import
            })
            .collect();
        (prelude + &self.out, imports, true)
    }

    pub(super) fn text(&self, node: Node<'_>) -> &'s str {
        &self.src[node.start_byte()..node.end_byte()]
    }

    pub(super) fn emit(&mut self, node: Node<'_>) {
        if let Some((id, kind)) = self.specifier {
            if node.id() == id {
                self.specifier = None;
                self.emit_specifier(node, kind);
                return;
            }
        }

        let kind = node.kind();
        if TYPE_ONLY_NODES.contains(&kind) {
            return;
        }
        if TYPE_WRAPPERS.contains(&kind) {
            if let Some(inner) = first_named_child(node) {
                self.emit(inner);
            }
            return;
        }

        match kind {
            "import_statement" if has_token(node, "type") => {}
            "export_statement" if is_type_only_export(node) => {}
            "import_statement" => self.emit_import(node),
            "export_statement" => self.emit_export(node),
            "call_expression" => self.emit_call(node),
            // `<T>expr` assertions only exist in the plain TypeScript grammar
            "type_assertion" => {
                if let Some(expr) = last_named_child(node) {
                    self.emit(expr);
                }
            }
            "enum_declaration" => self.emit_enum(node),
            "jsx_element" | "jsx_self_closing_element" | "jsx_fragment" => {
                self.has_jsx = true;
                self.lower_jsx(node);
            }
            _ => self.emit_children(node),
        }
    }

    /// Copy `node`, recursing into children
    pub(super) fn emit_children(&mut self, node: Node<'_>) {
        let src = self.src;
        let parent_kind = node.kind();
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();

        let mut pos = node.start_byte();
        for child in children {
            self.out.push_str(&src[pos..child.start_byte()]);
            pos = child.end_byte();
            if is_type_token(parent_kind, child.kind()) {
                continue;
            }
            self.emit(child);
        }
        self.out.push_str(&src[pos..node.end_byte()]);
    }

    fn emit_with_source(&mut self, node: Node<'_>, kind: ImportKind) {
        let Some(source) = node.child_by_field_name("source") else {
            self.emit_children(node);
            return;
        };
        let statement_start = self.out.len();
        let recorded = self.imports.len();
        self.specifier = Some((source.id(), kind));
        self.emit_children(node);
        if let Some(import) = self.imports.get_mut(recorded) {
            import.statement = Some(statement_start..self.out.len());
        }
    }

    /// Emit an import with its type-only bindings removed
    fn emit_import(&mut self, node: Node<'_>) {
        let clause = child_of_kind(node, "import_clause");
        let (Some(clause), Some(source)) = (clause, node.child_by_field_name("source")) else {
            // `import "x"` runs for its side effects
            self.emit_with_source(node, ImportKind::Static);
            return;
        };

        let mut total = 0;
        let mut bindings: Vec<String> = Vec::new();
        let mut named: Vec<&'s str> = Vec::new();
        let mut cursor = clause.walk();
        let parts: Vec<Node<'_>> = clause.named_children(&mut cursor).collect();
        for part in parts {
            match part.kind() {
                "identifier" => {
                    total += 1;
                    if self.is_value(self.text(part)) {
                        bindings.push(self.text(part).to_string());
                    }
                }
                "namespace_import" => {
                    total += 1;
                    let local = last_named_child(part).map(|n| self.text(n));
                    if local.is_some_and(|name| self.is_value(name)) {
                        bindings.push(self.text(part).to_string());
                    }
                }
                "named_imports" => {
                    for spec in children_of_kind(part, "import_specifier") {
                        total += 1;
                        if is_type_specifier(spec) {
                            continue;
                        }
                        let local = spec
                            .child_by_field_name("alias")
                            .or_else(|| spec.child_by_field_name("name"))
                            .map(|n| self.text(n));
                        if local.is_some_and(|name| self.is_value(name)) {
                            named.push(self.text(spec));
                        }
                    }
                }
                _ => {
                    self.emit_with_source(node, ImportKind::Static);
                    return;
                }
            }
        }

        let kept = bindings.len() + named.len();
        if total == 0 || kept == total {
            self.emit_with_source(node, ImportKind::Static);
            return;
        }
        if kept == 0 {
            return;
        }
        if !named.is_empty() {
            bindings.push(format!("{{ {} }}", named.join(", ")));
        }
        self.emit_rebuilt(
            node,
            &format!("import {} from ", bindings.join(", ")),
            source,
            ImportKind::Static,
        );
    }

    /// Emit an export, removing `type` specifiers from its clause
    fn emit_export(&mut self, node: Node<'_>) {
        let clause = child_of_kind(node, "export_clause");
        let Some(clause) = clause.filter(|c| {
            children_of_kind(*c, "export_specifier")
                .into_iter()
                .any(is_type_specifier)
        }) else {
            self.emit_with_source(node, ImportKind::ReExport);
            return;
        };

        let kept: Vec<&'s str> = children_of_kind(clause, "export_specifier")
            .into_iter()
            .filter(|spec| !is_type_specifier(*spec))
            .map(|spec| self.text(spec))
            .collect();
        if kept.is_empty() {
            return;
        }

        let src = self.src;
        let head = format!(
            "{}{{ {} }}",
            &src[node.start_byte()..clause.start_byte()],
            kept.join(", ")
        );
        match node.child_by_field_name("source") {
            Some(source) => {
                let head = format!("{}{}", head, &src[clause.end_byte()..source.start_byte()]);
                self.emit_rebuilt(node, &head, source, ImportKind::ReExport);
            }
            None => {
                self.out.push_str(&head);
                self.out.push_str(&src[clause.end_byte()..node.end_byte()]);
            }
        }
    }

    /// `head` then the recorded source literal then whatever followed it
    fn emit_rebuilt(&mut self, node: Node<'_>, head: &str, source: Node<'_>, kind: ImportKind) {
        let src = self.src;
        let statement_start = self.out.len();
        let recorded = self.imports.len();
        self.out.push_str(head);
        self.emit_specifier(source, kind);
        self.out.push_str(&src[source.end_byte()..node.end_byte()]);
        if let Some(import) = self.imports.get_mut(recorded) {
            import.statement = Some(statement_start..self.out.len());
        }
    }

    fn emit_call(&mut self, node: Node<'_>) {
        let is_dynamic_import = node
            .child_by_field_name("function")
            .is_some_and(|f| f.kind() == "import");
        let literal = node
            .child_by_field_name("arguments")
            .and_then(first_named_child)
            .filter(|arg| arg.kind() == "string");
        if let Some(arg) = literal.filter(|_| is_dynamic_import) {
            self.specifier = Some((arg.id(), ImportKind::Dynamic));
        }
        self.emit_children(node);
    }

    /// Copy a string literal specifier, recording where it landed
    fn emit_specifier(&mut self, literal: Node<'_>, kind: ImportKind) {
        let raw = self.text(literal);
        let start = self.out.len();
        self.out.push_str(raw);
        self.imports.push(ImportRef {
            specifier: unquote(raw).to_string(),
            span: start..self.out.len(),
            statement: None,
            kind,
        });
    }

    /// `enum E { A, B = 5, C }` → `const E = Object.freeze({A: 0, B: 5, C: 6});`
    fn emit_enum(&mut self, node: Node<'_>) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or("_enum");
        self.out.push_str("const ");
        self.out.push_str(name);
        self.out.push_str(" = Object.freeze({");

        let mut next: Option<i64> = Some(0);
        let mut first = true;
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            let members: Vec<Node<'_>> = body.named_children(&mut cursor).collect();
            for member in members {
                if member.kind() == "comment" {
                    continue;
                }
                if !first {
                    self.out.push_str(", ");
                }
                first = false;

                if member.kind() == "enum_assignment" {
                    let key = first_named_child(member)
                        .map(|n| self.text(n))
                        .unwrap_or("_");
                    self.out.push_str(key);
                    self.out.push_str(": ");
                    match member.child_by_field_name("value") {
                        Some(value) => {
                            next = if value.kind() == "number" {
                                self.text(value).parse::<i64>().ok().map(|n| n + 1)
                            } else {
                                None
                            };
                            self.emit(value);
                        }
                        None => self.out.push_str("undefined"),
                    }
                } else {
                    self.out.push_str(self.text(member));
                    self.out.push_str(": ");
                    match next {
                        Some(n) => {
                            self.out.push_str(&n.to_string());
                            next = Some(n + 1);
                        }
                        None => self.out.push_str("undefined"),
                    }
                }
            }
        }
        self.out.push_str("});");
    }
}

/// Tokens dropped from specific parents (`x?: T`, `readonly`, definite `!`)
fn is_type_token(parent: &str, token: &str) -> bool {
    match parent {
        "optional_parameter" => matches!(token, "?" | "readonly"),
        "required_parameter" => token == "readonly",
        "public_field_definition" => matches!(token, "?" | "!" | "readonly" | "declare" | "abstract"),
        "abstract_class_declaration" => token == "abstract",
        _ => false,
    }
}

/// Identifiers read as values anywhere outside imports and type positions
fn value_names<'s>(src: &'s str, root: Node<'_>) -> HashSet<&'s str> {
    let mut names = HashSet::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let kind = node.kind();
        if TYPE_ONLY_NODES.contains(&kind) || kind == "import_statement" {
            continue;
        }
        if kind == "export_statement" && is_type_only_export(node) {
            continue;
        }
        if kind == "export_specifier" && is_type_specifier(node) {
            continue;
        }
        if matches!(kind, "identifier" | "shorthand_property_identifier") {
            names.insert(&src[node.start_byte()..node.end_byte()]);
            continue;
        }
        // `x as T`, `x satisfies T`: only `x` is a value
        if matches!(kind, "as_expression" | "satisfies_expression") {
            stack.extend(first_named_child(node));
            continue;
        }
        let mut cursor = node.walk();
        stack.extend(node.named_children(&mut cursor));
    }
    names
}

/// `type X` / `typeof X` inside `{ .. }` of an import or export
fn is_type_specifier(spec: Node<'_>) -> bool {
    has_token(spec, "type") || has_token(spec, "typeof")
}

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn children_of_kind<'t>(node: Node<'t>, kind: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == kind)
        .collect();
    found
}

fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

/// `export type {..}`, `export interface ..`, `export type X = ..`, `export declare ..`
fn is_type_only_export(node: Node<'_>) -> bool {
    if has_token(node, "type") {
        return true;
    }
    node.child_by_field_name("declaration").is_some_and(|decl| {
        matches!(
            decl.kind(),
            "interface_declaration"
                | "type_alias_declaration"
                | "ambient_declaration"
                | "function_signature"
        )
    })
}

pub(super) fn first_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let first = node.named_children(&mut cursor).next();
    first
}

fn last_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let last = node.named_children(&mut cursor).last();
    last
}

fn unquote(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}
