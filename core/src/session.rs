//! Single-writer editing session.
//!
//! A [`SchemaSession`] owns the current tree. Edits are applied in place:
//! [`FieldTree::apply`] checks everything that can fail before it mutates,
//! so a failed edit changes nothing and the version stays put. The version
//! counter lets an edit source detect that the tree moved under it.

use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{Edit, EditOutcome, Field, FieldTree, Result, TreeError, export};

type ChangeListener = Box<dyn FnMut(&FieldTree, u64)>;

/// Current tree plus its version and change listeners.
///
/// # Examples
///
/// ```
/// use field_schema_core::*;
/// use serde_json::json;
///
/// let mut session = SchemaSession::new();
/// session.apply(&Edit::add_root()).unwrap();
/// session.apply(&Edit::update([0], "name", FieldType::String)).unwrap();
///
/// assert_eq!(session.version(), 2);
/// assert_eq!(serde_json::Value::Object(session.export()), json!({"name": "STRING"}));
///
/// // An edit based on an old version is refused.
/// let stale = session.apply_at(1, &Edit::delete([0]));
/// assert!(matches!(stale, Err(TreeError::VersionConflict { expected: 1, actual: 2 })));
/// ```
#[derive(Default)]
pub struct SchemaSession {
    tree: FieldTree,
    version: u64,
    listeners: Vec<ChangeListener>,
}

impl SchemaSession {
    /// Starts a session on an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session on an existing tree at version 0.
    pub fn from_tree(tree: FieldTree) -> Self {
        Self {
            tree,
            ..Self::default()
        }
    }

    /// The current tree.
    pub fn tree(&self) -> &FieldTree {
        &self.tree
    }

    /// Number of edits applied so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Registers a callback run after every successful edit with the new
    /// tree and version.
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&FieldTree, u64) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Applies an edit to the current tree.
    ///
    /// # Errors
    ///
    /// Propagates the tree's [`TreeError`]; the session is unchanged.
    pub fn apply(&mut self, edit: &Edit) -> Result<EditOutcome> {
        let outcome = self.tree.apply(edit).inspect_err(|err| {
            warn!(op = edit.op(), path = %edit.path(), error = %err, "Edit rejected");
        })?;

        self.version += 1;
        debug!(version = self.version, fields = self.tree.len(), "Session advanced");

        for listener in &mut self.listeners {
            listener(&self.tree, self.version);
        }
        Ok(outcome)
    }

    /// Applies an edit only if the session is still at `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::VersionConflict`] when the session has moved
    /// on, otherwise behaves like [`apply`](Self::apply).
    pub fn apply_at(&mut self, expected: u64, edit: &Edit) -> Result<EditOutcome> {
        if expected != self.version {
            return Err(TreeError::VersionConflict {
                expected,
                actual: self.version,
            });
        }
        self.apply(edit)
    }

    /// Exports the current tree.
    pub fn export(&self) -> Map<String, Value> {
        export(&self.tree)
    }

    /// The current tree in nested literal form.
    pub fn snapshot(&self) -> Vec<Field> {
        self.tree.to_fields()
    }

    /// Ends the session, returning the tree.
    pub fn into_tree(self) -> FieldTree {
        self.tree
    }
}

impl fmt::Debug for SchemaSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaSession")
            .field("tree", &self.tree)
            .field("version", &self.version)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::{FieldPath, FieldType};

    #[test]
    fn test_failed_edit_leaves_session_unchanged() {
        let mut session = SchemaSession::new();
        session.apply(&Edit::add_root()).unwrap();

        let err = session.apply(&Edit::rename([4], "x")).unwrap_err();
        assert_eq!(err, TreeError::PathNotFound(FieldPath::from([4])));
        assert_eq!(session.version(), 1);
        assert_eq!(session.tree().len(), 1);
    }

    #[test]
    fn test_listeners_see_each_new_version() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut session = SchemaSession::new();
        let sink = Rc::clone(&seen);
        session.on_change(move |tree, version| {
            sink.borrow_mut().push((version, export(tree)));
        });

        session.apply(&Edit::add_root()).unwrap();
        session.apply(&Edit::rename([0], "name")).unwrap();
        let _ = session.apply(&Edit::delete([9]));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, 1);
        assert_eq!(Value::Object(seen[0].1.clone()), json!({}));
        assert_eq!(Value::Object(seen[1].1.clone()), json!({"name": "STRING"}));
    }

    #[test]
    fn test_apply_at_current_version_succeeds() {
        let mut session = SchemaSession::new();
        session.apply_at(0, &Edit::add_root()).unwrap();
        session.apply_at(1, &Edit::retype([0], FieldType::Nested)).unwrap();
        assert_eq!(session.version(), 2);
    }

    #[test]
    fn test_snapshot_matches_tree() {
        let mut session = SchemaSession::new();
        session.apply(&Edit::add_root()).unwrap();
        session.apply(&Edit::update([0], "tags", FieldType::Nested)).unwrap();
        session.apply(&Edit::add_to([0])).unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].key, "tags");
        assert_eq!(snapshot[0].children.as_ref().map(Vec::len), Some(1));

        let restored = SchemaSession::from_tree(FieldTree::from_fields(&snapshot).unwrap());
        assert_eq!(restored.version(), 0);
        assert_eq!(restored.export(), session.export());
    }
}
