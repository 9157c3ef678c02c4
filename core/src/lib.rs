//! Nested field schema model and placeholder export.
//!
//! This crate models a schema as a tree of named, typed fields and folds
//! it into a JSON document where every leaf is replaced by a token naming
//! its type:
//!
//! - [`FieldTree`]: arena of fields keyed by [`FieldId`], with add,
//!   update, retype and delete operations addressed by id or [`FieldPath`].
//! - [`Edit`]: a single edit as issued by a front-end, applied in place
//!   ([`FieldTree::apply`]) or purely ([`FieldTree::with_edit`]).
//! - [`export`]: the placeholder fold (`string` → `"STRING"`, nested
//!   fields → objects, unnamed fields skipped).
//! - [`SchemaSession`]: single-writer holder of the current tree and its
//!   version, notifying listeners on every change.
//!
//! Validation ([`validate_fields`]) checks trees supplied in nested literal
//! form ([`Field`]); [`duplicate_keys`] reports sibling keys that shadow
//! each other in the export.
//!
//! # Example
//!
//! ```
//! use field_schema_core::*;
//!
//! let mut tree = FieldTree::new();
//! let name = tree.add_field(None).unwrap();
//! tree.set_key(name, "name").unwrap();
//!
//! let address = tree.add_field(None).unwrap();
//! tree.update_field(address, Some("address".into()), Some(FieldType::Nested)).unwrap();
//! let city = tree.add_field(Some(address)).unwrap();
//! tree.set_key(city, "city").unwrap();
//!
//! assert_eq!(
//!     export_value(&tree),
//!     serde_json::json!({"name": "STRING", "address": {"city": "STRING"}})
//! );
//! ```

mod edit;
mod error;
mod export;
mod session;
mod tree;
mod types;
mod validate;

pub use edit::{Edit, EditOutcome};
pub use error::{Result, TreeError};
pub use export::{export, export_value};
pub use session::SchemaSession;
pub use tree::{FieldNode, FieldTree, Iter};
pub use types::*;
pub use validate::{DuplicateKey, ValidationError, duplicate_keys, validate_fields};
