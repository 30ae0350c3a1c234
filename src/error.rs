//! Error types for the sketchvfs project tree and preview pipeline.

use thiserror::Error;

/// Tree-related errors (path validation and state conflicts)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Path already exists: {0}")]
    AlreadyExists(String),

    #[error("Parent directory does not exist: {0}")]
    ParentMissing(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Cannot delete root directory")]
    RootDeletion,

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

/// Patch-related errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("Search text not found in {path}")]
    NotFound { path: String },

    #[error(
        "Search text occurs {count} times in {path}; narrow the search text or set an occurrence count"
    )]
    AmbiguousMatch { path: String, count: usize },

    #[error("Expected {expected} occurrences in {path}, found {found}")]
    OccurrenceMismatch {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("Search text must not be empty")]
    EmptySearch,

    #[error("Line {line} is out of range for {path} (valid: 1..={max})")]
    OutOfRange { path: String, line: usize, max: usize },

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Preview assembly errors
///
/// Always reported as a single structured failure: kind, file, and message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("No entry point found (tried: {})", tried.join(", "))]
    NoEntryPoint { tried: Vec<String> },

    #[error("Syntax error in {path} at {line}:{column}: {message}")]
    SyntaxError {
        path: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unresolved import '{specifier}' in {importer}")]
    UnresolvedImport { importer: String, specifier: String },

    #[error("Parser setup failed: {0}")]
    Parser(String),
}

impl AssemblyError {
    /// Stable kind name for the structured report
    pub fn kind(&self) -> &'static str {
        match self {
            AssemblyError::NoEntryPoint { .. } => "NoEntryPoint",
            AssemblyError::SyntaxError { .. } => "SyntaxError",
            AssemblyError::UnresolvedImport { .. } => "UnresolvedImport",
            AssemblyError::Parser(_) => "Parser",
        }
    }

    /// File the failure is attributed to, if any
    pub fn file(&self) -> Option<&str> {
        match self {
            AssemblyError::SyntaxError { path, .. } => Some(path),
            AssemblyError::UnresolvedImport { importer, .. } => Some(importer),
            AssemblyError::NoEntryPoint { .. } | AssemblyError::Parser(_) => None,
        }
    }
}

/// Snapshot storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("Snapshot serialization failed: {0}")]
    Serialization(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Session, configuration, and tooling errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid edit intent: {0}")]
    InvalidIntent(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
