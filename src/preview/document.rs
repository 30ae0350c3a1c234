//! HTML document rendering
//!
//! The document carries the import map, inlined stylesheets, the mount
//! element, and a bootstrap module. The bootstrap imports the entry and, if
//! it default-exports a component, mounts it with `createRoot`; an entry that
//! renders itself is left alone. Load and render errors are printed into the
//! mount element.

use crate::config::PreviewConfig;
use std::fmt::Write;

/// A stylesheet inlined into the document head
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    pub path: String,
    pub content: String,
}

pub(crate) struct DocumentParts<'a> {
    pub config: &'a PreviewConfig,
    pub import_map_json: &'a str,
    pub styles: &'a [Stylesheet],
    /// Import-map key of the entry module
    pub entry_key: &'a str,
    pub entry_path: &'a str,
}

pub(crate) fn render(parts: &DocumentParts<'_>) -> String {
    let mut html = String::with_capacity(parts.import_map_json.len() + 2048);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\" />\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(&parts.config.title));
    let _ = writeln!(
        html,
        "<script type=\"importmap\">\n{}\n</script>",
        escape_script(parts.import_map_json)
    );
    for style in parts.styles {
        let _ = writeln!(
            html,
            "<style data-source=\"{}\">\n{}\n</style>",
            escape_html(&style.path),
            style.content.replace("</style", "<\\/style")
        );
    }
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(
        html,
        "<div id=\"{}\"></div>",
        escape_html(&parts.config.root_element_id)
    );
    html.push_str("<script type=\"module\">\n");
    html.push_str(&bootstrap(parts));
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

fn bootstrap(parts: &DocumentParts<'_>) -> String {
    let root_id = js_string(&parts.config.root_element_id);
    let entry_key = js_string(parts.entry_key);
    let entry_path = js_string(parts.entry_path);

    let script = format!(
        r#"import {{ createElement }} from "react";
import {{ createRoot }} from "react-dom/client";

const container = document.getElementById({root_id});
const showError = (error) => {{
  const pre = document.createElement("pre");
  pre.style.cssText = "color:#b91c1c;background:#fef2f2;padding:16px;margin:0;white-space:pre-wrap;font:13px/1.5 ui-monospace,monospace";
  pre.textContent = String((error && error.stack) || error);
  container.replaceChildren(pre);
}};
window.addEventListener("error", (event) => showError(event.error || event.message));
window.addEventListener("unhandledrejection", (event) => showError(event.reason));

try {{
  const entry = await import({entry_key});
  const Component = entry.default;
  if (typeof Component === "function" || (Component && typeof Component === "object" && "$$typeof" in Component)) {{
    createRoot(container).render(createElement(Component));
  }} else if (!container.hasChildNodes()) {{
    console.warn({entry_path} + " has no default export to mount");
  }}
}} catch (error) {{
  showError(error);
}}
"#
    );
    escape_script(&script)
}

fn js_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("{:?}", text))
}

/// Keep `</script>` sequences from terminating an inline script
fn escape_script(text: &str) -> String {
    text.replace("</", "<\\/")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
