//! Path-addressed edits as issued by an editing front-end.
//!
//! An [`Edit`] names its target by [`FieldPath`], the way a front-end that
//! renders the tree as nested rows knows it. Edits serialize with an `op`
//! tag so a sequence of them can be replayed from a script:
//!
//! ```
//! use field_schema_core::{Edit, FieldPath, FieldType};
//!
//! let edits: Vec<Edit> = serde_json::from_str(r#"[
//!     {"op": "add"},
//!     {"op": "update", "path": [0], "key": "address", "type": "nested"},
//!     {"op": "add", "parent": [0]},
//!     {"op": "rename", "path": [0, 0], "key": "city"}
//! ]"#).unwrap();
//!
//! assert_eq!(edits[1], Edit::Update {
//!     path: FieldPath::from([0]),
//!     key: Some("address".into()),
//!     field_type: Some(FieldType::Nested),
//! });
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{FieldId, FieldPath, FieldTree, FieldType, Result};

/// A single change to a field tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    /// Append an unnamed `string` field under `parent` (root when empty).
    Add {
        #[serde(default)]
        parent: FieldPath,
    },
    /// Change a field's key.
    Rename {
        path: FieldPath,
        #[serde(deserialize_with = "scalar_key::deserialize")]
        key: String,
    },
    /// Change a field's type.
    Retype {
        path: FieldPath,
        #[serde(rename = "type")]
        field_type: FieldType,
    },
    /// Change key and/or type in one step.
    Update {
        path: FieldPath,
        #[serde(
            default,
            deserialize_with = "optional_scalar_key::deserialize",
            skip_serializing_if = "Option::is_none"
        )]
        key: Option<String>,
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        field_type: Option<FieldType>,
    },
    /// Remove a field and its subtree.
    Delete { path: FieldPath },
}

impl Edit {
    /// Adds a field to the top-level list.
    pub fn add_root() -> Self {
        Edit::Add {
            parent: FieldPath::root(),
        }
    }

    /// Adds a field under the nested field at `parent`.
    pub fn add_to(parent: impl Into<FieldPath>) -> Self {
        Edit::Add {
            parent: parent.into(),
        }
    }

    /// Renames the field at `path`.
    pub fn rename(path: impl Into<FieldPath>, key: impl Into<String>) -> Self {
        Edit::Rename {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Retypes the field at `path`.
    pub fn retype(path: impl Into<FieldPath>, field_type: FieldType) -> Self {
        Edit::Retype {
            path: path.into(),
            field_type,
        }
    }

    /// Sets both key and type of the field at `path`.
    pub fn update(path: impl Into<FieldPath>, key: impl Into<String>, field_type: FieldType) -> Self {
        Edit::Update {
            path: path.into(),
            key: Some(key.into()),
            field_type: Some(field_type),
        }
    }

    /// Deletes the field at `path`.
    pub fn delete(path: impl Into<FieldPath>) -> Self {
        Edit::Delete { path: path.into() }
    }

    /// Short operation name, matching the serialized `op` tag.
    pub fn op(&self) -> &'static str {
        match self {
            Edit::Add { .. } => "add",
            Edit::Rename { .. } => "rename",
            Edit::Retype { .. } => "retype",
            Edit::Update { .. } => "update",
            Edit::Delete { .. } => "delete",
        }
    }

    /// The path this edit addresses (the parent path for adds).
    pub fn path(&self) -> &FieldPath {
        match self {
            Edit::Add { parent } => parent,
            Edit::Rename { path, .. }
            | Edit::Retype { path, .. }
            | Edit::Update { path, .. }
            | Edit::Delete { path } => path,
        }
    }
}

// Script authors write `key: 42` or `key: true` without quoting; such
// scalars are taken as their text.
mod scalar_key {
    use serde::{Deserialize, Deserializer, de::Error};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(key) => Ok(key),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(flag.to_string()),
            other => Err(D::Error::custom(format!(
                "invalid key: expected a string, number or boolean, found {other}"
            ))),
        }
    }
}

mod optional_scalar_key {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Key(#[serde(deserialize_with = "super::scalar_key::deserialize")] String);

        let key: Option<Key> = Option::deserialize(deserializer)?;
        Ok(key.map(|Key(key)| key))
    }
}

/// What an applied edit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// A field was appended.
    Added { id: FieldId, path: FieldPath },
    /// A field was renamed and/or retyped; `discarded` counts descendants
    /// dropped by a retype away from `nested`.
    Updated { id: FieldId, discarded: usize },
    /// A field was removed together with `removed - 1` descendants.
    Deleted { id: FieldId, removed: usize },
}

impl FieldTree {
    /// Applies an edit in place.
    ///
    /// # Errors
    ///
    /// Fails when the edit's path does not resolve in this tree, or when
    /// an add targets a field that is not nested or sits at
    /// [`FieldTree::MAX_DEPTH`]. Every check runs before the tree is
    /// touched, so a failed edit leaves it unchanged.
    pub fn apply(&mut self, edit: &Edit) -> Result<EditOutcome> {
        let outcome = match edit {
            Edit::Add { parent } => {
                let parent_id = self.resolve_parent(parent)?;
                let index = self.siblings(parent_id).map_or(0, <[_]>::len);
                let id = self.add_field(parent_id)?;
                EditOutcome::Added {
                    id,
                    path: parent.child(index),
                }
            }
            Edit::Rename { path, key } => {
                let id = self.resolve(path)?;
                self.set_key(id, key.clone())?;
                EditOutcome::Updated { id, discarded: 0 }
            }
            Edit::Retype { path, field_type } => {
                let id = self.resolve(path)?;
                let discarded = self.set_type(id, *field_type)?;
                EditOutcome::Updated { id, discarded }
            }
            Edit::Update {
                path,
                key,
                field_type,
            } => {
                let id = self.resolve(path)?;
                let discarded = self.update_field(id, key.clone(), *field_type)?;
                EditOutcome::Updated { id, discarded }
            }
            Edit::Delete { path } => {
                let id = self.resolve(path)?;
                let removed = self.delete_field(id)?;
                EditOutcome::Deleted { id, removed }
            }
        };

        debug!(op = edit.op(), path = %edit.path(), outcome = ?outcome, "Applied edit");
        Ok(outcome)
    }

    /// Applies an edit to a copy of this tree, leaving `self` untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use field_schema_core::{Edit, FieldTree};
    ///
    /// let empty = FieldTree::new();
    /// let (next, _) = empty.with_edit(&Edit::add_root()).unwrap();
    /// assert!(empty.is_empty());
    /// assert_eq!(next.len(), 1);
    /// ```
    pub fn with_edit(&self, edit: &Edit) -> Result<(FieldTree, EditOutcome)> {
        let mut next = self.clone();
        let outcome = next.apply(edit)?;
        Ok((next, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TreeError;

    fn build(edits: &[Edit]) -> FieldTree {
        let mut tree = FieldTree::new();
        for edit in edits {
            tree.apply(edit).unwrap();
        }
        tree
    }

    #[test]
    fn test_add_reports_new_path() {
        let mut tree = build(&[
            Edit::add_root(),
            Edit::add_root(),
            Edit::retype([1], FieldType::Nested),
            Edit::add_to([1]),
        ]);

        let outcome = tree.apply(&Edit::add_to([1])).unwrap();
        let EditOutcome::Added { id, path } = outcome else {
            panic!("expected Added, got {outcome:?}");
        };
        assert_eq!(path, FieldPath::from([1, 1]));
        assert_eq!(tree.path_of(id), Some(path));
    }

    #[test]
    fn test_add_under_leaf_path_fails() {
        let mut tree = build(&[Edit::add_root()]);
        assert_eq!(
            tree.apply(&Edit::add_to([0])),
            Err(TreeError::NotNested(FieldPath::from([0])))
        );
    }

    #[test]
    fn test_update_without_type_keeps_children() {
        let mut tree = build(&[
            Edit::add_root(),
            Edit::update([0], "address", FieldType::Nested),
            Edit::add_to([0]),
        ]);

        tree.apply(&Edit::Update {
            path: FieldPath::from([0]),
            key: Some("location".into()),
            field_type: None,
        })
        .unwrap();

        let id = tree.resolve(&FieldPath::from([0])).unwrap();
        assert_eq!(tree.get(id).unwrap().key(), "location");
        assert_eq!(tree.children(id).map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_retype_reports_discarded_descendants() {
        let mut tree = build(&[
            Edit::add_root(),
            Edit::retype([0], FieldType::Nested),
            Edit::add_to([0]),
            Edit::add_to([0]),
        ]);

        let outcome = tree.apply(&Edit::retype([0], FieldType::Boolean)).unwrap();
        assert!(matches!(outcome, EditOutcome::Updated { discarded: 2, .. }));
    }

    #[test]
    fn test_delete_reports_removed_count() {
        let mut tree = build(&[
            Edit::add_root(),
            Edit::retype([0], FieldType::Nested),
            Edit::add_to([0]),
            Edit::add_root(),
        ]);

        let outcome = tree.apply(&Edit::delete([0])).unwrap();
        assert!(matches!(outcome, EditOutcome::Deleted { removed: 2, .. }));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_failed_edits_leave_tree_unchanged() {
        let mut tree = build(&[
            Edit::add_root(),
            Edit::update([0], "address", FieldType::Nested),
            Edit::add_to([0]),
            Edit::rename([0, 0], "city"),
        ]);
        let before = serde_json::to_value(tree.to_fields()).unwrap();

        let failing = [
            (Edit::add_to([0, 0]), TreeError::NotNested(FieldPath::from([0, 0]))),
            (Edit::add_to([3]), TreeError::PathNotFound(FieldPath::from([3]))),
            (Edit::rename([0, 1], "zip"), TreeError::PathNotFound(FieldPath::from([0, 1]))),
            (Edit::retype(FieldPath::root(), FieldType::Float), TreeError::EmptyPath),
            (
                Edit::update([0, 0, 0], "x", FieldType::Number),
                TreeError::PathNotFound(FieldPath::from([0, 0, 0])),
            ),
            (Edit::delete([1]), TreeError::PathNotFound(FieldPath::from([1]))),
        ];
        for (edit, expected) in failing {
            assert_eq!(tree.apply(&edit), Err(expected), "{edit:?}");
            assert_eq!(serde_json::to_value(tree.to_fields()).unwrap(), before);
        }
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_with_edit_leaves_input_untouched() {
        let tree = build(&[Edit::add_root(), Edit::rename([0], "name")]);

        let (next, _) = tree.with_edit(&Edit::delete([0])).unwrap();
        assert!(next.is_empty());
        assert_eq!(tree.len(), 1);

        assert!(tree.with_edit(&Edit::delete([5])).is_err());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_edit_serialization_uses_op_tag() {
        let json = serde_json::to_value(Edit::retype([2, 0], FieldType::ObjectId)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"op": "retype", "path": [2, 0], "type": "objectId"})
        );

        let add: Edit = serde_json::from_str(r#"{"op":"add"}"#).unwrap();
        assert_eq!(add, Edit::add_root());
    }

    #[test]
    fn test_scalar_keys_are_read_as_text() {
        let edits: Vec<Edit> = serde_json::from_str(
            r#"[
                {"op": "rename", "path": [0], "key": 42},
                {"op": "update", "path": [1], "key": true},
                {"op": "update", "path": [2], "type": "float"}
            ]"#,
        )
        .unwrap();

        assert_eq!(edits[0], Edit::rename([0], "42"));
        assert_eq!(
            edits[1],
            Edit::Update {
                path: FieldPath::from([1]),
                key: Some("true".into()),
                field_type: None,
            }
        );
        assert_eq!(
            edits[2],
            Edit::Update {
                path: FieldPath::from([2]),
                key: None,
                field_type: Some(FieldType::Float),
            }
        );

        let nested = serde_json::from_str::<Edit>(r#"{"op": "rename", "path": [0], "key": [1]}"#);
        assert!(nested.is_err());
    }
}
