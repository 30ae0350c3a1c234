//! JSX lowering
//!
//! `<Tag a="x" {...rest}>text {expr}</Tag>` becomes
//! `__jsx(Tag, {a: "x", ...rest}, "text ", expr)`. Intrinsic tags (lowercase
//! or namespaced) become string literals; fragments use `__Fragment`.

use super::emit::Emitter;
use super::JSX_FRAGMENT;
use tree_sitter::Node;

/// Child kinds that are not raw text
const ELEMENT_CHILDREN: &[&str] = &[
    "jsx_element",
    "jsx_self_closing_element",
    "jsx_fragment",
    "jsx_expression",
];

impl Emitter<'_> {
    pub(super) fn lower_jsx(&mut self, node: Node<'_>) {
        let (name, attributes, body) = match node.kind() {
            "jsx_self_closing_element" => (
                node.child_by_field_name("name"),
                attributes_of(node),
                None,
            ),
            "jsx_element" => {
                let open = node.child_by_field_name("open_tag");
                (
                    open.and_then(|o| o.child_by_field_name("name")),
                    open.map(attributes_of).unwrap_or_default(),
                    Some(element_body(node)),
                )
            }
            _ => (None, Vec::new(), Some(fragment_body(node))),
        };

        self.out.push_str(super::JSX_FACTORY);
        self.out.push('(');
        self.emit_tag(name);
        self.out.push_str(", ");
        self.emit_props(&attributes);

        if let Some((start, end)) = body {
            self.emit_jsx_children(node, start, end);
        }
        self.out.push(')');
    }

    fn emit_tag(&mut self, name: Option<Node<'_>>) {
        let Some(name) = name else {
            self.out.push_str(JSX_FRAGMENT);
            return;
        };
        let text = self.text(name);
        let intrinsic = name.kind() == "jsx_namespace_name"
            || (name.kind() == "identifier"
                && text.chars().next().is_some_and(|c| c.is_ascii_lowercase()));
        if intrinsic {
            self.out.push_str(&js_string(text));
        } else {
            self.out.push_str(text);
        }
    }

    fn emit_props(&mut self, attributes: &[Node<'_>]) {
        if attributes.is_empty() {
            self.out.push_str("null");
            return;
        }

        self.out.push('{');
        for (i, attribute) in attributes.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            match attribute.kind() {
                // `{...rest}`
                "jsx_expression" => match expression_of(*attribute) {
                    Some(spread) => self.emit(spread),
                    None => self.out.push_str("...{}"),
                },
                _ => self.emit_attribute(*attribute),
            }
        }
        self.out.push('}');
    }

    fn emit_attribute(&mut self, attribute: Node<'_>) {
        let mut cursor = attribute.walk();
        let parts: Vec<Node<'_>> = attribute.named_children(&mut cursor).collect();
        let Some(key) = parts.first() else {
            return;
        };

        let key = self.text(*key);
        if is_identifier(key) {
            self.out.push_str(key);
        } else {
            self.out.push_str(&js_string(key));
        }
        self.out.push_str(": ");

        match parts.get(1) {
            None => self.out.push_str("true"),
            Some(value) if value.kind() == "string" => {
                let raw = self.text(*value);
                let inner = raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default();
                self.out.push_str(&js_string(&decode_entities(inner)));
            }
            Some(value) if value.kind() == "jsx_expression" => match expression_of(*value) {
                Some(expr) => self.emit(expr),
                None => self.out.push_str("undefined"),
            },
            Some(value) => self.emit(*value),
        }
    }

    /// Children between byte offsets `start` and `end`; text is whatever lies
    /// between element and expression children
    fn emit_jsx_children(&mut self, node: Node<'_>, start: usize, end: usize) {
        let src = self.src;
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node
            .named_children(&mut cursor)
            .filter(|c| ELEMENT_CHILDREN.contains(&c.kind()))
            .filter(|c| c.start_byte() >= start && c.end_byte() <= end)
            .collect();

        let mut pos = start;
        for child in children {
            self.emit_jsx_text(&src[pos..child.start_byte()]);
            pos = child.end_byte();
            if child.kind() == "jsx_expression" {
                // `{}` and `{/* comment */}` produce no child
                if let Some(expr) = expression_of(child) {
                    self.out.push_str(", ");
                    self.emit(expr);
                }
            } else {
                self.out.push_str(", ");
                self.emit(child);
            }
        }
        self.emit_jsx_text(&src[pos..end]);
    }

    fn emit_jsx_text(&mut self, raw: &str) {
        let cleaned = clean_jsx_text(raw);
        if cleaned.is_empty() {
            return;
        }
        self.out.push_str(", ");
        self.out.push_str(&js_string(&decode_entities(&cleaned)));
    }
}

fn attributes_of(tag: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = tag.walk();
    let attributes = tag
        .children_by_field_name("attribute", &mut cursor)
        .collect();
    attributes
}

/// Byte range between `<Tag ...>` and `</Tag>`
fn element_body(node: Node<'_>) -> (usize, usize) {
    let start = node
        .child_by_field_name("open_tag")
        .map_or(node.start_byte(), |o| o.end_byte());
    let end = node
        .child_by_field_name("close_tag")
        .map_or(node.end_byte(), |c| c.start_byte());
    (start, end)
}

/// Byte range between `<>` and `</>`
fn fragment_body(node: Node<'_>) -> (usize, usize) {
    let mut cursor = node.walk();
    let tokens: Vec<Node<'_>> = node.children(&mut cursor).filter(|c| !c.is_named()).collect();
    let start = tokens
        .iter()
        .find(|t| t.kind() == ">")
        .map_or(node.start_byte(), |t| t.end_byte());
    let end = tokens
        .iter()
        .rev()
        .find(|t| t.kind() == "<" || t.kind() == "</")
        .map_or(node.end_byte(), |t| t.start_byte());
    (start, end.max(start))
}

/// The expression inside `{...}`, skipping comments
fn expression_of(container: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = container.walk();
    let expr = container
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment");
    expr
}

/// JSX whitespace rules: lines are trimmed where they meet a line break,
/// blank lines dropped, and the rest joined by single spaces
pub(super) fn clean_jsx_text(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').collect();
    let last = lines.len() - 1;
    let mut kept: Vec<String> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let mut line = line.replace('\t', " ").replace('\r', "");
        if i != 0 {
            line = line.trim_start_matches(' ').to_string();
        }
        if i != last {
            line = line.trim_end_matches(' ').to_string();
        }
        if !line.is_empty() {
            kept.push(line);
        }
    }
    kept.join(" ")
}

/// Decode HTML character references (`&amp;`, `&#169;`, `&#xA9;`)
pub(super) fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi > 1 && semi <= 10)
            .and_then(|semi| entity(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix('x').or_else(|| number.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "trade" => '\u{2122}',
        "hellip" => '\u{2026}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        "bull" => '\u{2022}',
        "middot" => '\u{b7}',
        "times" => '\u{d7}',
        "larr" => '\u{2190}',
        "rarr" => '\u{2192}',
        _ => return None,
    };
    Some(c)
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Double-quoted JavaScript string literal
fn js_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("{:?}", text))
}
