use field_schema_core::{
    Edit, Field, FieldPath, FieldTree, FieldType, SchemaSession, export_value,
};
use serde_json::json;

fn tree_of(fields: Vec<Field>) -> FieldTree {
    FieldTree::from_fields(&fields).expect("literal tree should be valid")
}

fn assert_children_iff_nested(tree: &FieldTree) {
    for node in tree {
        assert_eq!(
            node.children().is_some(),
            node.field_type().is_nested(),
            "field {:?} of type {} breaks the children invariant",
            node.key(),
            node.field_type()
        );
    }
}

// ---------------------------------------------------------------------------
// Edits
// ---------------------------------------------------------------------------

#[test]
fn children_present_iff_nested_after_every_edit() {
    let mut session = SchemaSession::new();
    let edits = [
        Edit::add_root(),
        Edit::retype([0], FieldType::Nested),
        Edit::add_to([0]),
        Edit::add_to([0]),
        Edit::retype([0, 1], FieldType::Nested),
        Edit::add_to([0, 1]),
        Edit::update([0, 1, 0], "deep", FieldType::Float),
        Edit::retype([0, 1], FieldType::ObjectId),
        Edit::retype([0], FieldType::Nested),
        Edit::retype([0], FieldType::Boolean),
        Edit::retype([0], FieldType::Nested),
        Edit::add_to([0]),
    ];

    for edit in &edits {
        session.apply(edit).unwrap();
        assert_children_iff_nested(session.tree());
    }
}

#[test]
fn retype_away_and_back_loses_subtree() {
    let mut tree = FieldTree::new();
    for edit in [
        Edit::add_root(),
        Edit::update([0], "address", FieldType::Nested),
        Edit::add_to([0]),
        Edit::rename([0, 0], "city"),
        Edit::retype([0], FieldType::String),
        Edit::retype([0], FieldType::Nested),
    ] {
        tree.apply(&edit).unwrap();
    }

    let id = tree.resolve(&FieldPath::from([0])).unwrap();
    assert_eq!(tree.children(id), Some(&[][..]));
    assert_eq!(export_value(&tree), json!({"address": {}}));
}

#[test]
fn noop_retype_preserves_subtree() {
    let mut tree = FieldTree::new();
    for edit in [
        Edit::add_root(),
        Edit::update([0], "address", FieldType::Nested),
        Edit::add_to([0]),
        Edit::rename([0, 0], "city"),
        Edit::retype([0], FieldType::Nested),
    ] {
        tree.apply(&edit).unwrap();
    }

    assert_eq!(export_value(&tree), json!({"address": {"city": "STRING"}}));
}

#[test]
fn delete_shrinks_tree_by_subtree_size() {
    let mut tree = tree_of(vec![
        Field::leaf("keep", FieldType::String),
        Field::nested(
            "drop",
            vec![
                Field::leaf("a", FieldType::Number),
                Field::nested("b", vec![Field::leaf("c", FieldType::Boolean)]),
            ],
        ),
        Field::leaf("tail", FieldType::Float),
    ]);
    let target = tree.resolve(&FieldPath::from([1])).unwrap();
    let descendants = tree.subtree_size(target) - 1;
    let before = tree.len();

    tree.apply(&Edit::delete([1])).unwrap();

    assert_eq!(tree.len(), before - (1 + descendants));
    assert!(tree.iter().all(|node| node.key() != "c"));
    assert_eq!(export_value(&tree), json!({"keep": "STRING", "tail": "FLOAT"}));
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_skips_unnamed_field() {
    assert_eq!(
        export_value(&tree_of(vec![Field::leaf("", FieldType::String)])),
        json!({})
    );
}

#[test]
fn export_maps_each_type_to_its_placeholder() {
    let cases = [
        (FieldType::String, "STRING"),
        (FieldType::Number, "NUMBER"),
        (FieldType::Boolean, "BOOLEAN"),
        (FieldType::Float, "FLOAT"),
        (FieldType::ObjectId, "OBJECT ID"),
    ];
    for (field_type, token) in cases {
        assert_eq!(
            export_value(&tree_of(vec![Field::leaf("a", field_type)])),
            json!({ "a": token })
        );
    }
}

#[test]
fn export_nests_children() {
    let tree = tree_of(vec![Field::nested(
        "a",
        vec![Field::leaf("b", FieldType::String)],
    )]);
    assert_eq!(export_value(&tree), json!({"a": {"b": "STRING"}}));
}

#[test]
fn export_duplicate_key_last_write_wins() {
    let tree = tree_of(vec![
        Field::leaf("a", FieldType::String),
        Field::leaf("a", FieldType::Number),
    ]);
    assert_eq!(export_value(&tree), json!({"a": "NUMBER"}));
}

#[test]
fn export_handles_mixed_deep_tree() {
    let mut session = SchemaSession::new();
    let mut parent = FieldPath::root();
    for depth in 0..200 {
        session.apply(&Edit::add_to(parent.clone())).unwrap();
        session.apply(&Edit::add_to(parent.clone())).unwrap();
        let nested = parent.child(0);
        session
            .apply(&Edit::update(nested.clone(), format!("level{depth}"), FieldType::Nested))
            .unwrap();
        session
            .apply(&Edit::rename(parent.child(1), "leaf"))
            .unwrap();
        parent = nested;
    }

    let doc = serde_json::Value::Object(session.export());
    assert_eq!(doc["leaf"], json!("STRING"));
    assert_eq!(doc["level0"]["level1"]["leaf"], json!("STRING"));
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn build_name_and_address_schema() {
    let mut session = SchemaSession::new();
    let edits = [
        Edit::add_root(),
        Edit::update([0], "name", FieldType::String),
        Edit::add_root(),
        Edit::update([1], "address", FieldType::Nested),
        Edit::add_to([1]),
        Edit::update([1, 0], "city", FieldType::String),
    ];
    for edit in &edits {
        session.apply(edit).unwrap();
    }

    let rendered = serde_json::to_string(&session.export()).unwrap();
    assert_eq!(rendered, r#"{"name":"STRING","address":{"city":"STRING"}}"#);
    assert_eq!(session.version(), edits.len() as u64);
}
