//! Field type definitions for schema tree modeling.
//!
//! This module defines the value types shared by the arena
//! ([`FieldTree`](crate::FieldTree)) and the nested literal form used for
//! interchange and snapshots. The literal form serializes with [`serde`] to
//! the same `{"id", "key", "type", "children"}` object shape an editor
//! front-end works with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Opaque identity of a field.
///
/// Generated once when a field is created and never changed afterwards.
/// Identity is used for addressing only; two fields with the same key and
/// type are still different fields.
///
/// # Examples
///
/// ```
/// use field_schema_core::FieldId;
///
/// let a = FieldId::new();
/// let b = FieldId::new();
/// assert_ne!(a, b);
///
/// let parsed: FieldId = a.to_string().parse().unwrap();
/// assert_eq!(parsed, a);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(Ulid);

impl FieldId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for FieldId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

/// Kind of a field.
///
/// `Nested` is the only kind that owns children; every other kind is a
/// leaf that exports as a fixed placeholder token.
///
/// # Examples
///
/// ```
/// use field_schema_core::FieldType;
///
/// assert_eq!(FieldType::default(), FieldType::String);
/// assert_eq!(FieldType::ObjectId.placeholder(), Some("OBJECT ID"));
/// assert_eq!(FieldType::Nested.placeholder(), None);
/// assert_eq!("objectId".parse::<FieldType>().unwrap(), FieldType::ObjectId);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// Object holding child fields.
    Nested,
    /// String value (the type of a freshly added field).
    #[default]
    String,
    /// Integer value.
    Number,
    /// Boolean value.
    Boolean,
    /// Floating point value.
    Float,
    /// Document object identifier.
    ObjectId,
}

impl FieldType {
    /// Every field type, in the order an editor offers them.
    pub const ALL: [FieldType; 6] = [
        FieldType::Nested,
        FieldType::String,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Float,
        FieldType::ObjectId,
    ];

    /// Returns `true` for [`FieldType::Nested`].
    pub fn is_nested(self) -> bool {
        matches!(self, FieldType::Nested)
    }

    /// Returns the placeholder token a leaf of this type exports as.
    ///
    /// `Nested` has no token; it exports as an object of its children.
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            FieldType::Nested => None,
            FieldType::String => Some("STRING"),
            FieldType::Number => Some("NUMBER"),
            FieldType::Boolean => Some("BOOLEAN"),
            FieldType::Float => Some("FLOAT"),
            FieldType::ObjectId => Some("OBJECT ID"),
        }
    }

    /// Returns the serialized name (`"nested"`, `"objectId"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Nested => "nested",
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Float => "float",
            FieldType::ObjectId => "objectId",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown field type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field type: {0}")]
pub struct UnknownFieldType(pub String);

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownFieldType(s.to_string()))
    }
}

/// A field in nested literal form.
///
/// This is the interchange shape of a schema tree: each field owns its
/// children directly. `children` is present exactly when the type is
/// [`FieldType::Nested`]. Use [`FieldTree::from_fields`](crate::FieldTree::from_fields)
/// to turn a literal tree into an editable arena.
///
/// # Examples
///
/// ```
/// use field_schema_core::{Field, FieldType};
///
/// let address = Field::nested("address", vec![Field::leaf("city", FieldType::String)]);
/// assert_eq!(address.children.as_ref().map(Vec::len), Some(1));
///
/// let json = serde_json::to_value(&address).unwrap();
/// assert_eq!(json["type"], "nested");
/// assert_eq!(json["children"][0]["key"], "city");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// Stable identity.
    pub id: FieldId,
    /// User-supplied name; empty while not yet named.
    #[serde(default)]
    pub key: String,
    /// Kind of the field.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Child fields (nested fields only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Field>>,
}

impl Field {
    /// Creates an unnamed `string` field, the state of a freshly added field.
    pub fn new() -> Self {
        Self {
            id: FieldId::new(),
            key: String::new(),
            field_type: FieldType::String,
            children: None,
        }
    }

    /// Creates a field with the given key and type.
    ///
    /// A `Nested` type starts with an empty children list.
    pub fn leaf(key: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: FieldId::new(),
            key: key.into(),
            field_type,
            children: field_type.is_nested().then(Vec::new),
        }
    }

    /// Creates a nested field owning `children`.
    pub fn nested(key: impl Into<String>, children: Vec<Field>) -> Self {
        Self {
            id: FieldId::new(),
            key: key.into(),
            field_type: FieldType::Nested,
            children: Some(children),
        }
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}

/// Location of a field as sibling indices from the root.
///
/// `[2, 0]` is the first child of the third top-level field. The empty
/// path denotes the root forest itself; it is a valid parent for adds but
/// never addresses a field.
///
/// # Examples
///
/// ```
/// use field_schema_core::FieldPath;
///
/// let path = FieldPath::from([2, 0]);
/// assert_eq!(path.to_string(), "2.0");
/// assert_eq!(path.parent(), Some(FieldPath::from([2])));
/// assert_eq!(path.child(3), FieldPath::from([2, 0, 3]));
/// assert_eq!(FieldPath::root().to_string(), "<root>");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<usize>);

impl FieldPath {
    /// The empty path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` for the empty path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Sibling indices from the root down.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Index within the parent's children, `None` for the root path.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Path of the parent, `None` for the root path.
    pub fn parent(&self) -> Option<FieldPath> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    /// Path of the child at `index`.
    pub fn child(&self, index: usize) -> FieldPath {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }
}

impl From<Vec<usize>> for FieldPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl From<&[usize]> for FieldPath {
    fn from(indices: &[usize]) -> Self {
        Self(indices.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for FieldPath {
    fn from(indices: [usize; N]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_serialized_names() {
        let names: Vec<String> = FieldType::ALL
            .iter()
            .map(|t| serde_json::to_value(t).unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["nested", "string", "number", "boolean", "float", "objectId"]
        );
    }

    #[test]
    fn test_field_type_from_str_rejects_unknown() {
        let err = "date".parse::<FieldType>().unwrap_err();
        assert_eq!(err, UnknownFieldType("date".to_string()));
    }

    #[test]
    fn test_new_field_is_unnamed_string() {
        let field = Field::new();
        assert!(field.key.is_empty());
        assert_eq!(field.field_type, FieldType::String);
        assert!(field.children.is_none());
    }

    #[test]
    fn test_leaf_nested_starts_with_empty_children() {
        let field = Field::leaf("meta", FieldType::Nested);
        assert_eq!(field.children.map(|c| c.len()), Some(0));
    }

    #[test]
    fn test_field_deserializes_without_children() {
        let id = FieldId::new();
        let json = format!(r#"{{"id":"{id}","key":"age","type":"number"}}"#);
        let field: Field = serde_json::from_str(&json).unwrap();
        assert_eq!(field.id, id);
        assert_eq!(field.key, "age");
        assert_eq!(field.field_type, FieldType::Number);
        assert!(field.children.is_none());
    }

    #[test]
    fn test_path_serializes_as_index_array() {
        let path = FieldPath::from([1, 4]);
        assert_eq!(serde_json::to_string(&path).unwrap(), "[1,4]");
        assert_eq!(FieldPath::root().parent(), None);
        assert_eq!(FieldPath::from([7]).last(), Some(7));
    }
}
