//! Intent Generation
//!
//! Turns a user prompt into edit intents. A model-backed source lives
//! outside this crate; the sources here are the deterministic mock used
//! without a provider and a script source that replays intents from a file.

use crate::config::{GenerationBackend, GenerationConfig};
use crate::error::ApiError;
use crate::intent::{parse_intents, EditIntent};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Capability: prompt in, ordered edit intents out
pub trait IntentSource: Send + Sync {
    fn intents(&self, prompt: &str) -> Result<Vec<EditIntent>, ApiError>;
}

/// Build the source named by the configuration
///
/// A relative `script_path` resolves against `workspace_root`.
pub fn intent_source_from_config(
    config: &GenerationConfig,
    workspace_root: &Path,
) -> Result<Box<dyn IntentSource>, ApiError> {
    match config.backend {
        GenerationBackend::Mock => Ok(Box::new(MockIntentSource)),
        GenerationBackend::Script => {
            let script = config.script_path.as_ref().ok_or_else(|| {
                ApiError::ConfigError("The script backend requires script_path".to_string())
            })?;
            Ok(Box::new(ScriptIntentSource::new(workspace_root.join(script))))
        }
    }
}

/// Starter component chosen from prompt keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Starter {
    Counter,
    Form,
    Card,
    Welcome,
}

impl Starter {
    fn from_prompt(prompt: &str) -> Self {
        let prompt = prompt.to_lowercase();
        if prompt.contains("counter") || prompt.contains("count") {
            Starter::Counter
        } else if prompt.contains("form") || prompt.contains("contact") {
            Starter::Form
        } else if prompt.contains("card") || prompt.contains("profile") {
            Starter::Card
        } else {
            Starter::Welcome
        }
    }

    fn component(self) -> (&'static str, &'static str) {
        match self {
            Starter::Counter => ("Counter", COUNTER_SOURCE),
            Starter::Form => ("ContactForm", FORM_SOURCE),
            Starter::Card => ("Card", CARD_SOURCE),
            Starter::Welcome => ("Welcome", WELCOME_SOURCE),
        }
    }
}

/// Deterministic starter projects, no model required
#[derive(Debug, Clone, Copy, Default)]
pub struct MockIntentSource;

impl IntentSource for MockIntentSource {
    fn intents(&self, prompt: &str) -> Result<Vec<EditIntent>, ApiError> {
        let starter = Starter::from_prompt(prompt);
        let (name, source) = starter.component();
        debug!(?starter, "Mock generation");

        let title = serde_json::to_string(prompt.trim())
            .map_err(|e| ApiError::GenerationFailed(e.to_string()))?;
        let app = format!(
            r#"import {name} from "./components/{name}";
import "./styles.css";

export default function App() {{
  return (
    <main className="app">
      <h1>{{{title}}}</h1>
      <{name} />
    </main>
  );
}}
"#
        );

        Ok(vec![
            EditIntent::Create {
                path: "/App.jsx".to_string(),
                file_text: app,
            },
            EditIntent::Create {
                path: format!("/components/{}.jsx", name),
                file_text: source.to_string(),
            },
            EditIntent::Create {
                path: "/styles.css".to_string(),
                file_text: STYLES.to_string(),
            },
        ])
    }
}

/// Replays intents from a JSON file (array or single object)
#[derive(Debug, Clone)]
pub struct ScriptIntentSource {
    path: PathBuf,
}

impl ScriptIntentSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl IntentSource for ScriptIntentSource {
    fn intents(&self, _prompt: &str) -> Result<Vec<EditIntent>, ApiError> {
        let json = std::fs::read_to_string(&self.path).map_err(|e| {
            ApiError::GenerationFailed(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let intents = parse_intents(&json)?;
        info!(path = %self.path.display(), count = intents.len(), "Loaded scripted intents");
        Ok(intents)
    }
}

const COUNTER_SOURCE: &str = r#"import { useState } from "react";

export default function Counter() {
  const [count, setCount] = useState(0);
  return (
    <div className="panel">
      <p>Count: {count}</p>
      <button onClick={() => setCount(count - 1)}>-</button>
      <button onClick={() => setCount(count + 1)}>+</button>
    </div>
  );
}
"#;

const FORM_SOURCE: &str = r#"import { useState } from "react";

export default function ContactForm() {
  const [sent, setSent] = useState(false);
  if (sent) {
    return <p className="panel">Thanks, we will be in touch.</p>;
  }
  return (
    <form className="panel" onSubmit={(e) => { e.preventDefault(); setSent(true); }}>
      <label>
        Name <input name="name" required />
      </label>
      <label>
        Email <input name="email" type="email" required />
      </label>
      <button type="submit">Send</button>
    </form>
  );
}
"#;

const CARD_SOURCE: &str = r#"export default function Card({ title = "Ada Lovelace", body = "Wrote the first program." }) {
  return (
    <article className="panel">
      <h2>{title}</h2>
      <p>{body}</p>
    </article>
  );
}
"#;

const WELCOME_SOURCE: &str = r#"export default function Welcome() {
  return <p className="panel">Edit App.jsx to get started.</p>;
}
"#;

const STYLES: &str = r#"body {
  margin: 0;
  font-family: system-ui, sans-serif;
  background: #f8fafc;
}

.app {
  max-width: 40rem;
  margin: 2rem auto;
}

.panel {
  padding: 1rem;
  border-radius: 0.5rem;
  background: white;
  box-shadow: 0 1px 3px rgb(0 0 0 / 0.1);
}
"#;
