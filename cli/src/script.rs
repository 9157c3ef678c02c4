//! Edit script loading.
//!
//! A script is a YAML (or JSON) sequence of edits:
//!
//! ```yaml
//! - op: add
//! - op: update
//!   path: [0]
//!   key: address
//!   type: nested
//! - op: add
//!   parent: [0]
//! ```

use std::io::Read;
use std::path::Path;

use field_schema_core::{Edit, EditOutcome, SchemaSession};
use tracing::info;

use crate::error::{CliError, Result};

/// Reads a script from `path`, or from stdin when `path` is `None` or `-`.
pub fn read_script(path: Option<&Path>) -> Result<Vec<Edit>> {
    let raw = match path {
        Some(path) if path != Path::new("-") => {
            std::fs::read_to_string(path).map_err(|source| CliError::File {
                path: path.to_path_buf(),
                source,
            })?
        }
        _ => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            raw
        }
    };
    parse_script(&raw)
}

/// Parses script text. Blank input is an empty script.
pub fn parse_script(raw: &str) -> Result<Vec<Edit>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_yaml::from_str(raw)?)
}

/// Applies every edit in order, stopping at the first failure.
pub fn run_script(session: &mut SchemaSession, edits: &[Edit]) -> Result<Vec<EditOutcome>> {
    let mut outcomes = Vec::with_capacity(edits.len());
    for (index, edit) in edits.iter().enumerate() {
        let outcome = session.apply(edit).map_err(|source| CliError::Edit {
            index: index + 1,
            op: edit.op(),
            source,
        })?;
        outcomes.push(outcome);
    }
    info!(
        edits = edits.len(),
        fields = session.tree().len(),
        version = session.version(),
        "Script applied"
    );
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use field_schema_core::{FieldPath, FieldType, TreeError};

    use super::*;

    #[test]
    fn test_parse_yaml_script() {
        let edits = parse_script(
            r#"
- op: add
- op: update
  path: [0]
  key: address
  type: nested
- op: add
  parent: [0]
- op: retype
  path: [0, 0]
  type: objectId
"#,
        )
        .unwrap();

        assert_eq!(
            edits,
            vec![
                Edit::add_root(),
                Edit::update([0], "address", FieldType::Nested),
                Edit::add_to([0]),
                Edit::retype([0, 0], FieldType::ObjectId),
            ]
        );
    }

    #[test]
    fn test_parse_json_script() {
        let edits = parse_script(r#"[{"op": "add"}, {"op": "delete", "path": [0]}]"#).unwrap();
        assert_eq!(edits, vec![Edit::add_root(), Edit::delete([0])]);
    }

    #[test]
    fn test_parse_unquoted_scalar_keys() {
        let edits = parse_script(
            r#"
- op: rename
  path: [0]
  key: 2024
- op: update
  path: [1]
  key: true
  type: boolean
"#,
        )
        .unwrap();

        assert_eq!(edits[0], Edit::rename([0], "2024"));
        assert_eq!(edits[1], Edit::update([1], "true", FieldType::Boolean));
    }

    #[test]
    fn test_parse_blank_script() {
        assert!(parse_script("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_op() {
        assert!(parse_script("- op: move\n  path: [0]\n").is_err());
    }

    #[test]
    fn test_run_script_reports_failing_position() {
        let mut session = SchemaSession::new();
        let edits = vec![Edit::add_root(), Edit::rename([3], "x"), Edit::add_root()];

        let err = run_script(&mut session, &edits).unwrap_err();
        match err {
            CliError::Edit { index, op, source } => {
                assert_eq!(index, 2);
                assert_eq!(op, "rename");
                assert_eq!(source, TreeError::PathNotFound(FieldPath::from([3])));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(session.version(), 1);
    }
}
