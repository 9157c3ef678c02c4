//! Error types for the `schema-builder` binary.

use std::path::PathBuf;

use field_schema_core::TreeError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Stdin/stdout or other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A named file could not be read or written.
    #[error("failed to access '{}': {source}", .path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON rendering failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Edit script, config, or YAML rendering failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An edit in the script did not apply (1-based position).
    #[error("edit #{index} ({op}) failed: {source}")]
    Edit {
        index: usize,
        op: &'static str,
        source: TreeError,
    },

    /// `check --deny-duplicates` found shadowed keys.
    #[error("{0} duplicate key group(s) found")]
    DuplicateKeys(usize),
}

/// Convenience alias for results with [`CliError`].
pub type Result<T> = std::result::Result<T, CliError>;
