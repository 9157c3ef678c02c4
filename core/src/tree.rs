//! Arena representation of a field tree.
//!
//! Fields live in a map keyed by [`FieldId`]; each node records its parent
//! and, for nested fields, the ordered ids of its children. Replacing a
//! field by id is a map lookup, and translating between ids and
//! [`FieldPath`]s walks at most the depth of the tree.
//!
//! The tree upholds these invariants through every operation:
//!
//! - a node has a children list exactly when its type is
//!   [`FieldType::Nested`];
//! - ids are unique across the whole tree and never change;
//! - siblings keep insertion order and new fields always append;
//! - every node is owned by exactly one parent (or the root list).

use std::collections::HashMap;

use tracing::debug;

use crate::{Field, FieldId, FieldPath, FieldType, Result, TreeError, validate_fields};

/// A single field stored in a [`FieldTree`].
///
/// Nodes are read-only views; all changes go through the tree so the
/// structural invariants cannot be broken from outside.
#[derive(Debug, Clone)]
pub struct FieldNode {
    id: FieldId,
    key: String,
    field_type: FieldType,
    children: Option<Vec<FieldId>>,
    parent: Option<FieldId>,
}

impl FieldNode {
    /// Stable identity of the field.
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// User-supplied name; empty while the field is not yet named.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Kind of the field.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Ordered child ids, present only for nested fields.
    pub fn children(&self) -> Option<&[FieldId]> {
        self.children.as_deref()
    }

    /// Id of the owning field, `None` for top-level fields.
    pub fn parent(&self) -> Option<FieldId> {
        self.parent
    }

    fn to_field(&self, children: Option<Vec<Field>>) -> Field {
        Field {
            id: self.id,
            key: self.key.clone(),
            field_type: self.field_type,
            children,
        }
    }
}

/// An ordered forest of fields.
///
/// # Examples
///
/// ```
/// use field_schema_core::{FieldPath, FieldTree, FieldType};
///
/// let mut tree = FieldTree::new();
/// let user = tree.add_field(None).unwrap();
/// tree.update_field(user, Some("user".into()), Some(FieldType::Nested)).unwrap();
/// let email = tree.add_field(Some(user)).unwrap();
///
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.path_of(email), Some(FieldPath::from([0, 0])));
/// assert_eq!(tree.resolve(&FieldPath::from([0, 0])).unwrap(), email);
///
/// // Retyping away from nested drops the whole subtree.
/// tree.set_type(user, FieldType::String).unwrap();
/// assert_eq!(tree.len(), 1);
/// assert!(!tree.contains(email));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldTree {
    nodes: HashMap<FieldId, FieldNode>,
    roots: Vec<FieldId>,
}

impl FieldTree {
    /// Deepest level a field may sit at; top-level fields are at depth 0.
    ///
    /// Exported documents are ordinary recursive `serde_json` values, and
    /// formatting or dropping them recurses once per level.
    pub const MAX_DEPTH: usize = 512;

    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from nested literal fields.
    ///
    /// A `nested` field without a `children` list gets an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Invalid`] when ids repeat, a leaf type
    /// carries children or a field lies deeper than [`Self::MAX_DEPTH`].
    ///
    /// # Examples
    ///
    /// ```
    /// use field_schema_core::{Field, FieldTree, FieldType};
    ///
    /// let fields = vec![
    ///     Field::leaf("name", FieldType::String),
    ///     Field::nested("address", vec![Field::leaf("city", FieldType::String)]),
    /// ];
    /// let tree = FieldTree::from_fields(&fields).unwrap();
    /// assert_eq!(tree.len(), 3);
    /// assert_eq!(tree.roots().len(), 2);
    /// ```
    pub fn from_fields(fields: &[Field]) -> Result<Self> {
        if let Some(error) = validate_fields(fields).into_iter().next() {
            return Err(error.into());
        }

        let mut tree = Self::new();
        let mut stack: Vec<(Option<FieldId>, &Field)> =
            fields.iter().rev().map(|field| (None, field)).collect();

        while let Some((parent, field)) = stack.pop() {
            tree.nodes.insert(
                field.id,
                FieldNode {
                    id: field.id,
                    key: field.key.clone(),
                    field_type: field.field_type,
                    children: field.field_type.is_nested().then(Vec::new),
                    parent,
                },
            );

            match parent {
                None => tree.roots.push(field.id),
                Some(parent_id) => {
                    if let Some(siblings) = tree
                        .nodes
                        .get_mut(&parent_id)
                        .and_then(|node| node.children.as_mut())
                    {
                        siblings.push(field.id);
                    }
                }
            }

            if let Some(children) = &field.children {
                stack.extend(children.iter().rev().map(|child| (Some(field.id), child)));
            }
        }

        Ok(tree)
    }

    /// Converts the tree back into nested literal fields.
    pub fn to_fields(&self) -> Vec<Field> {
        struct Frame<'a> {
            ids: &'a [FieldId],
            next: usize,
            built: Vec<Field>,
            owner: Option<&'a FieldNode>,
        }

        let mut stack = vec![Frame {
            ids: &self.roots,
            next: 0,
            built: Vec::new(),
            owner: None,
        }];

        while let Some(frame) = stack.last_mut() {
            let next = frame.ids.get(frame.next).copied();
            frame.next += 1;

            match next {
                Some(id) => {
                    let Some(node) = self.nodes.get(&id) else {
                        continue;
                    };
                    match node.children() {
                        Some(children) => stack.push(Frame {
                            ids: children,
                            next: 0,
                            built: Vec::new(),
                            owner: Some(node),
                        }),
                        None => frame.built.push(node.to_field(None)),
                    }
                }
                None => {
                    let Some(done) = stack.pop() else {
                        break;
                    };
                    let Some(owner) = done.owner else {
                        return done.built;
                    };
                    let field = owner.to_field(Some(done.built));
                    match stack.last_mut() {
                        Some(parent) => parent.built.push(field),
                        None => return vec![field],
                    }
                }
            }
        }

        Vec::new()
    }

    /// Number of fields at any depth.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when the tree has no fields.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` when `id` is part of the tree.
    pub fn contains(&self, id: FieldId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Looks up a field by id.
    pub fn get(&self, id: FieldId) -> Option<&FieldNode> {
        self.nodes.get(&id)
    }

    /// Top-level field ids in sibling order.
    pub fn roots(&self) -> &[FieldId] {
        &self.roots
    }

    /// Child ids of a nested field; `None` for leaves and unknown ids.
    pub fn children(&self, id: FieldId) -> Option<&[FieldId]> {
        self.nodes.get(&id)?.children()
    }

    /// The sibling list owned by `parent`, or the root list for `None`.
    pub fn siblings(&self, parent: Option<FieldId>) -> Option<&[FieldId]> {
        match parent {
            None => Some(&self.roots),
            Some(id) => self.children(id),
        }
    }

    /// Resolves a path to the id of the field it addresses.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyPath`] for the root path and
    /// [`TreeError::PathNotFound`] when any index is out of range or
    /// descends through a leaf.
    pub fn resolve(&self, path: &FieldPath) -> Result<FieldId> {
        let not_found = || TreeError::PathNotFound(path.clone());
        let (&last, init) = path
            .indices()
            .split_last()
            .ok_or(TreeError::EmptyPath)?;

        let mut siblings: &[FieldId] = &self.roots;
        for &index in init {
            let id = *siblings.get(index).ok_or_else(not_found)?;
            siblings = self.children(id).ok_or_else(not_found)?;
        }
        siblings.get(last).copied().ok_or_else(not_found)
    }

    /// Resolves a path naming where new fields are added.
    ///
    /// The root path yields `None` (the top-level list). Any other path
    /// must address a nested field.
    pub fn resolve_parent(&self, path: &FieldPath) -> Result<Option<FieldId>> {
        if path.is_root() {
            return Ok(None);
        }
        let id = self.resolve(path)?;
        if self.children(id).is_none() {
            return Err(TreeError::NotNested(path.clone()));
        }
        Ok(Some(id))
    }

    /// Computes the current path of a field.
    pub fn path_of(&self, id: FieldId) -> Option<FieldPath> {
        let mut indices = Vec::new();
        let mut current = self.nodes.get(&id)?;
        loop {
            let siblings = self.siblings(current.parent)?;
            indices.push(siblings.iter().position(|s| *s == current.id)?);
            match current.parent {
                Some(parent) => current = self.nodes.get(&parent)?,
                None => break,
            }
        }
        indices.reverse();
        Some(FieldPath::from(indices))
    }

    /// Nesting depth of a field; top-level fields are at depth 0.
    pub fn depth(&self, id: FieldId) -> Option<usize> {
        let mut node = self.nodes.get(&id)?;
        let mut depth = 0;
        while let Some(parent) = node.parent {
            depth += 1;
            node = self.nodes.get(&parent)?;
        }
        Some(depth)
    }

    /// Number of fields in the subtree rooted at `id`, including itself.
    ///
    /// Returns `0` for unknown ids.
    pub fn subtree_size(&self, id: FieldId) -> usize {
        let mut stack = vec![id];
        let mut count = 0;
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                count += 1;
                stack.extend(node.children().unwrap_or_default());
            }
        }
        count
    }

    /// Iterates all fields in pre-order, siblings in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Appends an unnamed `string` field.
    ///
    /// The field goes to the end of `parent`'s children, or to the end of
    /// the top-level list when `parent` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownField`] if `parent` is not in the tree,
    /// [`TreeError::NotNested`] if it is not a nested field and
    /// [`TreeError::TooDeep`] if it already sits at [`Self::MAX_DEPTH`].
    pub fn add_field(&mut self, parent: Option<FieldId>) -> Result<FieldId> {
        let id = self.fresh_id();

        match parent {
            None => self.roots.push(id),
            Some(parent_id) => {
                if self.depth(parent_id) >= Some(Self::MAX_DEPTH) {
                    return Err(self.too_deep(parent_id));
                }
                let node = self
                    .nodes
                    .get_mut(&parent_id)
                    .ok_or(TreeError::UnknownField(parent_id))?;
                if !node.field_type.is_nested() {
                    return Err(self.not_nested(parent_id));
                }
                node.children.get_or_insert_with(Vec::new).push(id);
            }
        }

        self.nodes.insert(
            id,
            FieldNode {
                id,
                key: String::new(),
                field_type: FieldType::String,
                children: None,
                parent,
            },
        );
        Ok(id)
    }

    /// Renames a field. Type and children are left untouched.
    pub fn set_key(&mut self, id: FieldId, key: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.key = key.into();
        Ok(())
    }

    /// Changes a field's type, enforcing the children policy.
    ///
    /// - to `nested` without children: starts an empty children list;
    /// - `nested` to `nested`: children are kept;
    /// - away from `nested`: children and all their descendants are
    ///   removed from the tree.
    ///
    /// Returns the number of descendant fields that were discarded.
    pub fn set_type(&mut self, id: FieldId, field_type: FieldType) -> Result<usize> {
        let node = self.node_mut(id)?;
        node.field_type = field_type;

        if field_type.is_nested() {
            node.children.get_or_insert_with(Vec::new);
            return Ok(0);
        }

        let dropped = node.children.take().unwrap_or_default();
        let removed = self.remove_subtrees(dropped);
        if removed > 0 {
            debug!(field = %id, field_type = %field_type, removed, "Retype discarded nested fields");
        }
        Ok(removed)
    }

    /// Applies a key and/or type change to one field.
    ///
    /// Returns the number of descendant fields discarded by the retype.
    pub fn update_field(
        &mut self,
        id: FieldId,
        key: Option<String>,
        field_type: Option<FieldType>,
    ) -> Result<usize> {
        if !self.contains(id) {
            return Err(TreeError::UnknownField(id));
        }
        if let Some(key) = key {
            self.set_key(id, key)?;
        }
        match field_type {
            Some(field_type) => self.set_type(id, field_type),
            None => Ok(0),
        }
    }

    /// Removes a field and its entire subtree.
    ///
    /// Later siblings shift down by one. Returns the number of removed
    /// fields (`1 + ` the number of descendants).
    pub fn delete_field(&mut self, id: FieldId) -> Result<usize> {
        let parent = self
            .nodes
            .get(&id)
            .ok_or(TreeError::UnknownField(id))?
            .parent;

        let siblings = match parent {
            None => &mut self.roots,
            Some(parent_id) => self
                .nodes
                .get_mut(&parent_id)
                .and_then(|node| node.children.as_mut())
                .ok_or(TreeError::UnknownField(parent_id))?,
        };
        siblings.retain(|sibling| *sibling != id);

        Ok(self.remove_subtrees(vec![id]))
    }

    fn node_mut(&mut self, id: FieldId) -> Result<&mut FieldNode> {
        self.nodes.get_mut(&id).ok_or(TreeError::UnknownField(id))
    }

    fn not_nested(&self, id: FieldId) -> TreeError {
        self.path_of(id)
            .map_or(TreeError::UnknownField(id), TreeError::NotNested)
    }

    fn too_deep(&self, id: FieldId) -> TreeError {
        self.path_of(id)
            .map_or(TreeError::UnknownField(id), |path| TreeError::TooDeep {
                path,
                limit: Self::MAX_DEPTH,
            })
    }

    fn fresh_id(&self) -> FieldId {
        loop {
            let id = FieldId::new();
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    fn remove_subtrees(&mut self, ids: Vec<FieldId>) -> usize {
        let mut stack = ids;
        let mut removed = 0;
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(&id) {
                removed += 1;
                stack.extend(node.children.into_iter().flatten());
            }
        }
        removed
    }
}

/// Pre-order iterator over the fields of a [`FieldTree`].
#[derive(Debug)]
pub struct Iter<'a> {
    tree: &'a FieldTree,
    stack: Vec<FieldId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a FieldNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(node) = self.tree.nodes.get(&id) {
                if let Some(children) = node.children() {
                    self.stack.extend(children.iter().rev().copied());
                }
                return Some(node);
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a FieldTree {
    type Item = &'a FieldNode;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
