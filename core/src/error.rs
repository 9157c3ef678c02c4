//! Error types for field tree operations.
//!
//! Edits only fail when they address something the current tree does not
//! contain, which a front-end deriving its paths from the tree it just
//! rendered never produces. Export never fails.

use thiserror::Error;

use crate::{FieldId, FieldPath, ValidationError};

/// Errors that can occur while editing a field tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A path does not resolve to a field in the current tree.
    #[error("no field at path {0}")]
    PathNotFound(FieldPath),

    /// A field id is not (or no longer) part of the tree.
    #[error("unknown field id: {0}")]
    UnknownField(FieldId),

    /// Children were added under a field that is not `nested`.
    #[error("field at path {0} is not nested")]
    NotNested(FieldPath),

    /// Children were added below the deepest allowed level.
    #[error("field at path {path} is at the depth limit of {limit}")]
    TooDeep {
        /// Path of the would-be parent.
        path: FieldPath,
        /// Maximum field depth.
        limit: usize,
    },

    /// The root path was given where a field is required.
    #[error("the root path does not address a field")]
    EmptyPath,

    /// An optimistic edit was issued against a stale tree version.
    #[error("version conflict: expected {expected}, current is {actual}")]
    VersionConflict {
        /// Version the caller based its edit on.
        expected: u64,
        /// Version the session is actually at.
        actual: u64,
    },

    /// A literal tree violates a structural invariant.
    #[error("invalid field tree: {0}")]
    Invalid(#[from] ValidationError),
}

/// Convenience alias for results with [`TreeError`].
pub type Result<T> = std::result::Result<T, TreeError>;
