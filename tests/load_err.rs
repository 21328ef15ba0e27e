use flowspec::{SpecError, loader::parse_spec_text};

#[test]
fn unreadable_json_is_fatal() {
    let err = parse_spec_text("{not json").unwrap_err();
    assert!(matches!(err, SpecError::Json { .. }), "got {err:?}");
    assert!(err.to_string().contains("cannot be read"));
}

#[test]
fn empty_document_is_fatal() {
    let err = parse_spec_text("   \n").unwrap_err();
    assert!(matches!(err, SpecError::EmptyDocument { .. }), "got {err:?}");
}

#[test]
fn non_object_root_is_fatal() {
    let err = parse_spec_text("[1, 2, 3]").unwrap_err();
    assert!(matches!(err, SpecError::MissingRoot { .. }), "got {err:?}");
}

#[test]
fn missing_nodes_array_is_fatal() {
    let err = parse_spec_text(r#"{"edges": []}"#).unwrap_err();
    match &err {
        SpecError::MissingCollection { field, .. } => assert_eq!(*field, "nodes"),
        other => panic!("expected MissingCollection, got {other:?}"),
    }
    assert!(err.to_string().contains("\"nodes\""));
}

#[test]
fn missing_edges_array_is_fatal() {
    let err = parse_spec_text(r#"{"nodes": []}"#).unwrap_err();
    match &err {
        SpecError::MissingCollection { field, .. } => assert_eq!(*field, "edges"),
        other => panic!("expected MissingCollection, got {other:?}"),
    }
    assert!(err.to_string().contains("\"edges\""));
}

#[test]
fn node_without_position_is_fatal() {
    let err = parse_spec_text(r#"{"nodes": [{"id": "a", "routePath": "/a"}], "edges": []}"#)
        .unwrap_err();
    match &err {
        SpecError::NodePosition { node_id, .. } => assert_eq!(node_id, "a"),
        other => panic!("expected NodePosition, got {other:?}"),
    }
    assert!(err.to_string().contains("'a'"));
}

#[test]
fn node_with_non_numeric_position_is_fatal() {
    let err = parse_spec_text(
        r#"{"nodes": [{"id": "a", "position": {"x": "0", "y": 4}}], "edges": []}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SpecError::NodePosition { .. }), "got {err:?}");
}

#[test]
fn non_object_node_entry_is_fatal() {
    let err = parse_spec_text(r#"{"nodes": [42], "edges": []}"#).unwrap_err();
    match &err {
        SpecError::NodeShape { index, .. } => assert_eq!(*index, 0),
        other => panic!("expected NodeShape, got {other:?}"),
    }
}

#[test]
fn edge_without_target_is_fatal() {
    let err = parse_spec_text(
        r#"{"nodes": [], "edges": [{"id": "e1", "source": "a"}]}"#,
    )
    .unwrap_err();
    match &err {
        SpecError::EdgeEndpoints { edge_ref, .. } => assert_eq!(edge_ref, "e1"),
        other => panic!("expected EdgeEndpoints, got {other:?}"),
    }
}

#[test]
fn edge_without_source_names_index_when_id_missing() {
    let err = parse_spec_text(r#"{"nodes": [], "edges": [{"target": "b"}]}"#).unwrap_err();
    match &err {
        SpecError::EdgeEndpoints { edge_ref, .. } => assert_eq!(edge_ref, "0"),
        other => panic!("expected EdgeEndpoints, got {other:?}"),
    }
}

#[test]
fn non_object_edge_entry_is_fatal() {
    let err = parse_spec_text(r#"{"nodes": [], "edges": ["e"]}"#).unwrap_err();
    assert!(matches!(err, SpecError::EdgeShape { index: 0, .. }), "got {err:?}");
}

#[test]
fn json_errors_carry_a_position() {
    let err = parse_spec_text("{\n  \"nodes\": [,]\n}").unwrap_err();
    let location = err.location();
    assert_eq!(location.line, Some(2));
    assert!(location.col.is_some());
}
