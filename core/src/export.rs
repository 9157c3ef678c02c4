//! Placeholder export of a field tree.
//!
//! Folds a [`FieldTree`] into a JSON object: named leaves become their
//! type's placeholder token, nested fields become objects of their
//! children, and unnamed fields are left out. Siblings sharing a key
//! collapse into one entry holding the last sibling's value, at the
//! position of the first.
//!
//! # Example
//!
//! ```
//! use field_schema_core::*;
//! use serde_json::json;
//!
//! let fields = vec![
//!     Field::leaf("a", FieldType::String),
//!     Field::leaf("", FieldType::Number),
//!     Field::leaf("a", FieldType::Number),
//!     Field::nested("b", vec![Field::leaf("c", FieldType::ObjectId)]),
//! ];
//! let tree = FieldTree::from_fields(&fields).unwrap();
//!
//! assert_eq!(export_value(&tree), json!({"a": "NUMBER", "b": {"c": "OBJECT ID"}}));
//! ```

use serde_json::{Map, Value};
use tracing::trace;

use crate::{FieldId, FieldTree};

struct Frame<'a> {
    ids: &'a [FieldId],
    next: usize,
    output: Map<String, Value>,
    key: Option<&'a str>,
}

impl<'a> Frame<'a> {
    fn new(ids: &'a [FieldId], key: Option<&'a str>) -> Self {
        Self {
            ids,
            next: 0,
            output: Map::new(),
            key,
        }
    }
}

/// Exports a tree as a JSON object of placeholder values.
///
/// Never fails: every field type has a defined mapping and a nested field
/// without children exports as `{}`. The walk itself uses an explicit
/// stack; the returned document nests as deep as the tree, which
/// [`FieldTree::MAX_DEPTH`] keeps within what `serde_json` can format and
/// drop recursively.
pub fn export(tree: &FieldTree) -> Map<String, Value> {
    let mut stack = vec![Frame::new(tree.roots(), None)];

    while let Some(frame) = stack.last_mut() {
        let next = frame.ids.get(frame.next).copied();
        frame.next += 1;

        let Some(id) = next else {
            let Some(done) = stack.pop() else {
                break;
            };
            match (stack.last_mut(), done.key) {
                (Some(parent), Some(key)) => {
                    parent
                        .output
                        .insert(key.to_string(), Value::Object(done.output));
                }
                _ => {
                    trace!(entries = done.output.len(), fields = tree.len(), "Exported field tree");
                    return done.output;
                }
            }
            continue;
        };

        let Some(node) = tree.get(id) else {
            continue;
        };
        if node.key().is_empty() {
            continue;
        }

        match node.field_type().placeholder() {
            Some(token) => {
                frame
                    .output
                    .insert(node.key().to_string(), Value::String(token.to_string()));
            }
            None => {
                let children = node.children().unwrap_or_default();
                stack.push(Frame::new(children, Some(node.key())));
            }
        }
    }

    Map::new()
}

/// Same as [`export`], wrapped as a [`Value::Object`].
pub fn export_value(tree: &FieldTree) -> Value {
    Value::Object(export(tree))
}
