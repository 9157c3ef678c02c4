//! Field tree validation.
//!
//! [`validate_fields`] checks the structural invariants of a tree given in
//! nested literal form before it is loaded into an arena: ids must be
//! unique across the whole tree, only `nested` fields may carry children
//! and no field may lie deeper than [`FieldTree::MAX_DEPTH`].
//!
//! [`duplicate_keys`] is advisory. Siblings sharing a key are legal; the
//! export keeps only the last one, and the lint lets a front-end point
//! that out.
//!
//! # Examples
//!
//! ```
//! use field_schema_core::*;
//!
//! let good = vec![Field::nested("a", vec![Field::leaf("b", FieldType::String)])];
//! assert!(validate_fields(&good).is_empty());
//!
//! // Invalid: a string field with children
//! let mut bad = Field::leaf("a", FieldType::String);
//! bad.children = Some(vec![Field::new()]);
//! assert!(!validate_fields(&[bad]).is_empty());
//! ```

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::{Field, FieldId, FieldPath, FieldTree, FieldType};

/// Structural problems in a literal field tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two fields anywhere in the tree share an id.
    #[error("duplicate field id: {0}")]
    DuplicateId(FieldId),
    /// A non-nested field carries a children list.
    #[error("field {id} of type {field_type} cannot have children")]
    ChildrenOnLeaf {
        /// Offending field.
        id: FieldId,
        /// Its (leaf) type.
        field_type: FieldType,
    },
    /// A field lies deeper than the tree allows.
    #[error("field {id} is nested deeper than {limit} levels")]
    TooDeep {
        /// First field found below the limit.
        id: FieldId,
        /// Maximum field depth.
        limit: usize,
    },
}

/// Validates a tree in nested literal form.
///
/// Stops at the first problem found, walking fields in pre-order.
pub fn validate_fields(fields: &[Field]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<FieldId> = HashSet::new();
    let mut stack: Vec<(&Field, usize)> = fields.iter().rev().map(|field| (field, 0)).collect();

    while let Some((field, depth)) = stack.pop() {
        if !seen.insert(field.id) {
            errors.push(ValidationError::DuplicateId(field.id));
            return errors;
        }
        if depth > FieldTree::MAX_DEPTH {
            errors.push(ValidationError::TooDeep {
                id: field.id,
                limit: FieldTree::MAX_DEPTH,
            });
            return errors;
        }

        if let Some(children) = &field.children {
            if !field.field_type.is_nested() {
                errors.push(ValidationError::ChildrenOnLeaf {
                    id: field.id,
                    field_type: field.field_type,
                });
                return errors;
            }
            stack.extend(children.iter().rev().map(|child| (child, depth + 1)));
        }
    }

    errors
}

/// A key used by more than one field in the same sibling list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    /// Path of the owning field (the root path for top-level fields).
    pub parent: FieldPath,
    /// The shared key.
    pub key: String,
    /// Paths of every field using the key, in sibling order. The last one
    /// is the entry that survives export.
    pub paths: Vec<FieldPath>,
}

/// Lists every non-empty key shared by siblings, in pre-order.
///
/// # Examples
///
/// ```
/// use field_schema_core::*;
///
/// let tree = FieldTree::from_fields(&[
///     Field::leaf("id", FieldType::ObjectId),
///     Field::leaf("id", FieldType::String),
/// ]).unwrap();
///
/// let duplicates = duplicate_keys(&tree);
/// assert_eq!(duplicates.len(), 1);
/// assert_eq!(duplicates[0].key, "id");
/// assert_eq!(duplicates[0].paths, vec![FieldPath::from([0]), FieldPath::from([1])]);
/// ```
pub fn duplicate_keys(tree: &FieldTree) -> Vec<DuplicateKey> {
    let mut found = Vec::new();
    let mut stack: Vec<(FieldPath, &[FieldId])> = vec![(FieldPath::root(), tree.roots())];

    while let Some((parent, siblings)) = stack.pop() {
        let mut order: Vec<&str> = Vec::new();
        let mut by_key: HashMap<&str, Vec<FieldPath>> = HashMap::new();
        let mut nested = Vec::new();

        for (index, id) in siblings.iter().enumerate() {
            let Some(node) = tree.get(*id) else {
                continue;
            };
            let path = parent.child(index);
            if let Some(children) = node.children() {
                nested.push((path.clone(), children));
            }
            if node.key().is_empty() {
                continue;
            }
            by_key
                .entry(node.key())
                .or_insert_with(|| {
                    order.push(node.key());
                    Vec::new()
                })
                .push(path);
        }

        for key in order {
            if let Some(paths) = by_key.remove(key).filter(|paths| paths.len() > 1) {
                found.push(DuplicateKey {
                    parent: parent.clone(),
                    key: key.to_string(),
                    paths,
                });
            }
        }

        stack.extend(nested.into_iter().rev());
    }

    found
}
