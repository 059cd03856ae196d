//! Error types for the registry generator.
//!
//! Only run-level preconditions surface as `Err`. Problems with a single
//! block, file or metadata entry are logged and skipped by the stage that
//! hit them.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("metadata file not found: {}", path.display())]
    MetadataNotFound { path: PathBuf },

    #[error("failed to read metadata file {}: {source}", path.display())]
    MetadataRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid metadata file {}: {reason}", path.display())]
    MetadataFormat { path: PathBuf, reason: String },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("tree-sitter grammar rejected: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

impl GeneratorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
