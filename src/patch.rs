//! Patch Engine
//!
//! String-replacement and line-insertion edits over a single file's content.
//! The primitives are pure: they take content and return new content, or an
//! error with nothing written. The `FileTree` helpers at the bottom read,
//! patch, and commit in one step.

use crate::error::{PatchError, TreeError};
use crate::tree::FileTree;
use tracing::{debug, instrument};

/// How many matches a replacement is expected to affect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrences {
    /// Exactly this many matches must exist; all of them are replaced
    Exactly(usize),
    /// Replace every match, however many (explicit opt-in)
    All,
}

impl Default for Occurrences {
    fn default() -> Self {
        Occurrences::Exactly(1)
    }
}

impl Occurrences {
    /// Build from the optional count / replace-all flag used at the tool boundary
    pub fn from_request(count: Option<usize>, replace_all: bool) -> Self {
        match (replace_all, count) {
            (true, _) => Occurrences::All,
            (false, Some(n)) => Occurrences::Exactly(n),
            (false, None) => Occurrences::default(),
        }
    }
}

/// Replace `search` with `replacement` in `content`
///
/// With the default [`Occurrences::Exactly(1)`], more than one match is an
/// [`PatchError::AmbiguousMatch`]; the caller must narrow the search text or
/// state the occurrence count.
pub fn replace(
    path: &str,
    content: &str,
    search: &str,
    replacement: &str,
    occurrences: Occurrences,
) -> Result<String, PatchError> {
    if search.is_empty() {
        return Err(PatchError::EmptySearch);
    }

    let found = content.matches(search).count();
    if found == 0 {
        return Err(PatchError::NotFound {
            path: path.to_string(),
        });
    }

    match occurrences {
        Occurrences::Exactly(1) if found > 1 => Err(PatchError::AmbiguousMatch {
            path: path.to_string(),
            count: found,
        }),
        Occurrences::Exactly(expected) if expected != found => {
            Err(PatchError::OccurrenceMismatch {
                path: path.to_string(),
                expected,
                found,
            })
        }
        Occurrences::Exactly(_) | Occurrences::All => Ok(content.replace(search, replacement)),
    }
}

/// Insert `text` so that it becomes line `line` (1-based)
///
/// `line` may be one past the last line to append. The content's line ending
/// (`\r\n` or `\n`) and trailing newline are preserved.
pub fn insert_at_line(
    path: &str,
    content: &str,
    line: usize,
    text: &str,
) -> Result<String, PatchError> {
    let ending = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let trailing_newline = content.ends_with('\n');

    let mut lines: Vec<&str> = content.lines().collect();
    let max = lines.len() + 1;
    if line == 0 || line > max {
        return Err(PatchError::OutOfRange {
            path: path.to_string(),
            line,
            max,
        });
    }

    let inserted: Vec<&str> = if text.is_empty() {
        vec![""]
    } else {
        text.lines().collect()
    };
    let at = line - 1;
    lines.splice(at..at, inserted);

    let mut updated = lines.join(ending);
    if trailing_newline {
        updated.push_str(ending);
    }
    Ok(updated)
}

impl FileTree {
    /// Apply [`replace`] to a file and commit the result
    #[instrument(skip(self, search, replacement), fields(path = %path))]
    pub fn replace_in_file(
        &mut self,
        path: &str,
        search: &str,
        replacement: &str,
        occurrences: Occurrences,
    ) -> Result<String, PatchError> {
        let node = self.read(path)?;
        let content = node
            .content()
            .ok_or_else(|| TreeError::NotAFile(node.path().to_string()))?;
        let updated = replace(node.path(), content, search, replacement, occurrences)?;
        self.update(path, updated.as_str())?;
        debug!(bytes = updated.len(), "Replacement committed");
        Ok(updated)
    }

    /// Apply [`insert_at_line`] to a file and commit the result
    #[instrument(skip(self, text), fields(path = %path, line))]
    pub fn insert_in_file(
        &mut self,
        path: &str,
        line: usize,
        text: &str,
    ) -> Result<String, PatchError> {
        let node = self.read(path)?;
        let content = node
            .content()
            .ok_or_else(|| TreeError::NotAFile(node.path().to_string()))?;
        let updated = insert_at_line(node.path(), content, line, text)?;
        self.update(path, updated.as_str())?;
        debug!(bytes = updated.len(), "Insertion committed");
        Ok(updated)
    }
}
