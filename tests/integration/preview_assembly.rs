//! Integration tests for preview assembly

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sketchvfs::config::PreviewConfig;
use sketchvfs::error::AssemblyError;
use sketchvfs::preview::PreviewAssembler;
use sketchvfs::tree::FileTree;
use std::collections::BTreeMap;

fn tree_with(files: &[(&str, &str)]) -> FileTree {
    let mut tree = FileTree::new();
    for (path, content) in files {
        tree.create_with_parents(path, Some(*content)).unwrap();
    }
    tree
}

fn decode(handle: &str) -> String {
    let encoded = handle
        .strip_prefix("data:text/javascript;base64,")
        .expect("module handle is a base64 data URL");
    String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap()
}

/// `/App.jsx` is the entry when it is the only candidate
#[test]
fn test_app_jsx_is_the_entry() {
    let tree = tree_with(&[(
        "/App.jsx",
        "export default function App() {\n  return <div className=\"app\">Hello</div>;\n}\n",
    )]);
    let artifact = PreviewAssembler::default().assemble(&tree).unwrap();

    assert_eq!(artifact.entry, "/App.jsx");
    let code = decode(artifact.import_map.get("@/App.jsx").unwrap());
    assert!(code.contains("__jsx(\"div\", {className: \"app\"}, \"Hello\")"));
    assert!(code.starts_with("import { createElement as __jsx, Fragment as __Fragment } from \"react\";"));
    assert!(artifact.document.contains("<div id=\"root\"></div>"));
}

/// No candidate at all is a NoEntryPoint failure listing what was tried
#[test]
fn test_no_entry_point() {
    let tree = tree_with(&[("/lib/util.js", "export const x = 1;")]);
    match PreviewAssembler::default().assemble(&tree) {
        Err(AssemblyError::NoEntryPoint { tried }) => {
            assert!(tried.contains(&"/App.jsx".to_string()));
            assert!(tried.contains(&"/src/index.tsx".to_string()));
        }
        other => panic!("expected NoEntryPoint, got {:?}", other),
    }
}

/// A missing `./Button` names both the importer and the specifier
#[test]
fn test_unresolved_import_names_importer_and_specifier() {
    let tree = tree_with(&[(
        "/App.jsx",
        "import Button from './Button';\nexport default () => <Button />;\n",
    )]);
    let err = PreviewAssembler::default().assemble(&tree).unwrap_err();

    assert_eq!(err.kind(), "UnresolvedImport");
    assert_eq!(err.file(), Some("/App.jsx"));
    let message = err.to_string();
    assert!(message.contains("/App.jsx"));
    assert!(message.contains("./Button"));
}

#[test]
fn test_button_resolves_through_extension_probe() {
    let tree = tree_with(&[
        (
            "/App.jsx",
            "import Button from './Button';\nexport default () => <Button />;\n",
        ),
        (
            "/Button.tsx",
            "type Props = { label?: string };\nexport default function Button({ label = 'Go' }: Props) {\n  return <button>{label}</button>;\n}\n",
        ),
    ]);
    let artifact = PreviewAssembler::default().assemble(&tree).unwrap();

    let button = artifact.module("/Button.tsx").unwrap();
    assert!(!button.code.contains("type Props"));
    assert!(!button.code.contains(": Props"));
    let app = artifact.module("/App.jsx").unwrap();
    assert!(app.code.contains("from \"@/Button.tsx\""));
}

#[test]
fn test_syntax_error_in_reachable_module_fails() {
    let tree = tree_with(&[
        ("/App.jsx", "import Card from './Card';\nexport default Card;\n"),
        ("/Card.jsx", "export default () => <div>;\n"),
    ]);
    match PreviewAssembler::default().assemble(&tree) {
        Err(AssemblyError::SyntaxError { path, line, .. }) => {
            assert_eq!(path, "/Card.jsx");
            assert!(line >= 1);
        }
        other => panic!("expected SyntaxError, got {:?}", other),
    }
}

#[test]
fn test_fallback_entry_and_custom_config() {
    let tree = tree_with(&[
        ("/src/index.tsx", "import { greet } from '~/lib/greet';\ngreet();\n"),
        ("/src/lib/greet.ts", "export const greet = (): void => console.log('hi');\n"),
    ]);
    let mut packages = BTreeMap::new();
    packages.insert("react".to_string(), "18.3.1".to_string());
    let config = PreviewConfig {
        cdn_base: "https://cdn.example".to_string(),
        packages,
        alias_prefix: "~/".to_string(),
        ..PreviewConfig::default()
    };
    let assembler = PreviewAssembler::new(config);

    // "~/lib/greet" is relative to the tree root, not /src
    let err = assembler.assemble(&tree).unwrap_err();
    assert!(matches!(err, AssemblyError::UnresolvedImport { .. }));

    let tree = tree_with(&[
        ("/src/index.tsx", "import { greet } from '~/src/lib/greet';\ngreet();\n"),
        ("/src/lib/greet.ts", "export const greet = (): void => console.log('hi');\n"),
    ]);
    let artifact = assembler.assemble(&tree).unwrap();
    assert_eq!(artifact.entry, "/src/index.tsx");
    assert_eq!(
        artifact.import_map.get("react"),
        Some("https://cdn.example/react@18.3.1")
    );
    assert_eq!(
        artifact.import_map.get("react-dom/client"),
        Some("https://cdn.example/react-dom/client")
    );
    assert!(artifact.import_map.get("~/src/lib/greet.ts").is_some());
    assert!(artifact.document.contains("await import(\"~/src/index.tsx\")"));
}

#[test]
fn test_identical_trees_share_fingerprint() {
    let files = [
        ("/App.jsx", "export default () => <p>a</p>;\n"),
        ("/b.js", "export const b = 1;\n"),
    ];
    let first = PreviewAssembler::default().assemble(&tree_with(&files)).unwrap();
    let second = PreviewAssembler::default().assemble(&tree_with(&files)).unwrap();
    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(first.document, second.document);
}

/// Interface-only modules drop out of the graph along with the imports naming them
#[test]
fn test_type_only_module_is_not_linked() {
    let tree = tree_with(&[
        (
            "/App.tsx",
            "import { Props } from './types';\nimport { type Theme, accent } from './theme';\nconst p: Props = { title: 'Hi' };\nexport default function App() {\n  const t: Theme = { accent };\n  return <h1 style={{ color: t.accent }}>{p.title}</h1>;\n}\n",
        ),
        (
            "/types.ts",
            "export interface Props {\n  title: string;\n}\n",
        ),
        (
            "/theme.ts",
            "export type Theme = { accent: string };\nexport const accent = '#c0ffee';\n",
        ),
    ]);
    let artifact = PreviewAssembler::default().assemble(&tree).unwrap();

    let order: Vec<&str> = artifact.modules.iter().map(|m| m.path.as_str()).collect();
    assert_eq!(order, vec!["/theme.ts", "/App.tsx"]);
    assert!(artifact.import_map.get("@/types.ts").is_none());

    let app = decode(artifact.import_map.get("@/App.tsx").unwrap());
    assert!(!app.contains("Props"));
    assert!(app.contains("import { accent } from \"@/theme.ts\";"));
    let theme = decode(artifact.import_map.get("@/theme.ts").unwrap());
    assert!(theme.contains("export const accent = '#c0ffee';"));
    assert!(!theme.contains("Theme"));
}

/// Modules that import each other link through their import-map keys
#[test]
fn test_mutual_imports_link() {
    let tree = tree_with(&[
        (
            "/App.jsx",
            "import { isEven } from './even';\nexport default () => <p>{String(isEven(10))}</p>;\n",
        ),
        (
            "/even.js",
            "import { isOdd } from './odd';\nexport function isEven(n) { return n === 0 || isOdd(n - 1); }\n",
        ),
        (
            "/odd.js",
            "import { isEven } from './even';\nexport function isOdd(n) { return n !== 0 && isEven(n - 1); }\n",
        ),
    ]);
    let artifact = PreviewAssembler::default().assemble(&tree).unwrap();
    assert!(artifact.diagnostics.is_empty());
    let odd = decode(artifact.import_map.get("@/odd.js").unwrap());
    assert!(odd.contains("from \"@/even.js\""));
    let even = decode(artifact.import_map.get("@/even.js").unwrap());
    assert!(even.contains("from \"@/odd.js\""));
}
