//! Integration tests for sessions driven by edit intents

use sketchvfs::error::{ApiError, PatchError};
use sketchvfs::generation::{IntentSource, MockIntentSource};
use sketchvfs::intent::{parse_intents, EditIntent};
use sketchvfs::preview::PreviewAssembler;
use sketchvfs::session::ProjectSession;
use sketchvfs::store::SledSnapshotStore;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const SCRIPT: &str = r#"[
  {"command": "create", "path": "/App.jsx", "file_text": "import Button from './components/Button';\nexport default function App() {\n  return <Button label=\"Go\" />;\n}\n"},
  {"command": "create", "path": "/components/Button.jsx", "file_text": "export default function Button({ label }) {\n  return <button>{label}</button>;\n}\n"},
  {"command": "str_replace", "path": "/App.jsx", "old_str": "label=\"Go\"", "new_str": "label=\"Start\""},
  {"command": "insert", "path": "/App.jsx", "insert_line": 0, "new_str": "// entry"}
]"#;

#[test]
fn test_scripted_session_previews_and_persists() {
    let dir = TempDir::new().unwrap();
    let store = SledSnapshotStore::new(dir.path()).unwrap();

    let session = ProjectSession::open(&store, "scripted").unwrap();
    let intents = parse_intents(SCRIPT).unwrap();
    let outcomes = session.apply_all(&intents).unwrap();
    assert_eq!(outcomes.len(), 4);
    session.save(&store).unwrap();

    let reopened = ProjectSession::open(&store, "scripted").unwrap();
    let app = reopened.read(|tree| {
        tree.read("/App.jsx")
            .unwrap()
            .content()
            .unwrap()
            .to_string()
    });
    assert!(app.starts_with("// entry\nimport Button"));
    assert!(app.contains("label=\"Start\""));

    let artifact = reopened.preview(&PreviewAssembler::default()).unwrap();
    let order: Vec<&str> = artifact.modules.iter().map(|m| m.path.as_str()).collect();
    assert_eq!(order, vec!["/components/Button.jsx", "/App.jsx"]);
}

#[test]
fn test_ambiguous_replace_surfaces_as_structured_error() {
    let session = ProjectSession::new("p");
    session
        .apply(&EditIntent::Create {
            path: "/f.jsx".to_string(),
            file_text: "X X".to_string(),
        })
        .unwrap();

    let err = session
        .apply(&EditIntent::StrReplace {
            path: "/f.jsx".to_string(),
            old_str: "X".to_string(),
            new_str: "Y".to_string(),
            occurrences: None,
            replace_all: false,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Patch(PatchError::AmbiguousMatch { count: 2, .. })
    ));

    session
        .apply(&EditIntent::StrReplace {
            path: "/f.jsx".to_string(),
            old_str: "X".to_string(),
            new_str: "Y".to_string(),
            occurrences: None,
            replace_all: true,
        })
        .unwrap();
    assert_eq!(
        session.read(|tree| tree.read("/f.jsx").unwrap().content().map(str::to_string)),
        Some("Y Y".to_string())
    );
}

#[test]
fn test_readers_run_alongside_writer() {
    let session = Arc::new(ProjectSession::new("shared"));
    session
        .apply_all(&MockIntentSource.intents("counter").unwrap())
        .unwrap();

    let writer = {
        let session = Arc::clone(&session);
        thread::spawn(move || {
            for i in 0..20 {
                session
                    .apply(&EditIntent::Create {
                        path: format!("/notes/{}.txt", i),
                        file_text: i.to_string(),
                    })
                    .unwrap();
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                for _ in 0..5 {
                    let artifact = session.preview(&PreviewAssembler::default()).unwrap();
                    assert_eq!(artifact.entry, "/App.jsx");
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(session.read(|tree| tree.list("/notes").unwrap().len()), 20);
}
