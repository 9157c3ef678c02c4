//! Output formatting for exported documents, outlines and lint results.

use field_schema_core::{DuplicateKey, FieldId, FieldPath, FieldTree};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Formats an exported document in the requested format.
pub fn format_document(
    document: &Map<String, Value>,
    format: OutputFormat,
    compact: bool,
) -> Result<String> {
    let text = match format {
        OutputFormat::Json if compact => serde_json::to_string(document)?,
        OutputFormat::Json => serde_json::to_string_pretty(document)?,
        OutputFormat::Yaml => serde_yaml::to_string(document)?,
    };
    Ok(text)
}

/// Renders the tree one field per line, indented by depth.
///
/// ```text
/// 0     name: string
/// 1     address: nested
///   1.0   city: string
/// 2     <unnamed>: number
/// ```
pub fn render_outline(tree: &FieldTree) -> String {
    let mut out = String::new();
    let mut stack: Vec<(FieldPath, FieldId)> = tree
        .roots()
        .iter()
        .enumerate()
        .rev()
        .map(|(index, id)| (FieldPath::root().child(index), *id))
        .collect();

    while let Some((path, id)) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        let key = if node.key().is_empty() {
            "<unnamed>"
        } else {
            node.key()
        };
        out.push_str(&format!(
            "{indent}{path:<6}{key}: {field_type}\n",
            indent = "  ".repeat(path.depth() - 1),
            path = path.to_string(),
            field_type = node.field_type(),
        ));

        let children = node.children().unwrap_or_default();
        stack.extend(
            children
                .iter()
                .enumerate()
                .rev()
                .map(|(index, child)| (path.child(index), *child)),
        );
    }

    if out.is_empty() {
        out.push_str("(no fields)\n");
    }
    out
}

/// Renders duplicate key findings, one line per shared key.
pub fn render_duplicates(duplicates: &[DuplicateKey]) -> String {
    if duplicates.is_empty() {
        return "No duplicate keys.\n".to_string();
    }

    let mut out = String::new();
    for duplicate in duplicates {
        let paths: Vec<String> = duplicate.paths.iter().map(ToString::to_string).collect();
        let winner = paths.last().map(String::as_str).unwrap_or_default();
        out.push_str(&format!(
            "warning: key \"{}\" repeated under {} at {} (exported from {winner})\n",
            duplicate.key,
            duplicate.parent,
            paths.join(", "),
        ));
    }
    out
}
