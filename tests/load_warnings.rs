use flowspec::{
    loader::normalize_spec_value,
    model::UNGROUPED_CHUNK_ID,
};
use serde_json::json;

#[test]
fn unknown_kind_warns_and_falls_back_to_route() {
    let doc = json!({
        "nodes": [{"id": "a", "kind": "teleport", "routePath": "/a", "position": {"x": 0.0, "y": 0.0}}],
        "edges": []
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 1, "{:?}", normalized.warnings);
    assert!(normalized.warnings[0].contains("unknown kind 'teleport'"));
    assert_eq!(
        normalized.spec.nodes[0].kind,
        flowspec::model::NodeKind::Route
    );
}

#[test]
fn absent_kind_defaults_silently() {
    let doc = json!({
        "nodes": [{"id": "a", "routePath": "/a", "position": {"x": 0.0, "y": 0.0}}],
        "edges": []
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert!(normalized.warnings.is_empty(), "{:?}", normalized.warnings);
}

#[test]
fn unknown_chunk_reference_is_coerced_to_ungrouped() {
    let doc = json!({
        "nodes": [{"id": "a", "routePath": "/a", "chunkId": "ghost", "position": {"x": 0.0, "y": 0.0}}],
        "edges": []
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 1, "{:?}", normalized.warnings);
    assert!(normalized.warnings[0].contains("unknown chunk 'ghost'"));
    assert_eq!(normalized.spec.nodes[0].chunk_id, UNGROUPED_CHUNK_ID);
}

#[test]
fn portal_without_target_is_dropped_with_one_warning() {
    let doc = json!({
        "nodes": [{"id": "a", "routePath": "/a", "position": {"x": 0.0, "y": 0.0},
                   "portal": {"targetType": "route"}}],
        "edges": []
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 1, "{:?}", normalized.warnings);
    assert!(normalized.warnings[0].contains("unusable portal config"));
    assert!(normalized.spec.nodes[0].portal.is_none());
}

#[test]
fn portal_with_wrong_shape_is_dropped_with_one_warning() {
    let doc = json!({
        "nodes": [{"id": "a", "routePath": "/a", "position": {"x": 0.0, "y": 0.0}, "portal": 7}],
        "edges": []
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 1, "{:?}", normalized.warnings);
    assert!(normalized.spec.nodes[0].portal.is_none());
}

#[test]
fn null_portal_is_a_valid_node_state() {
    let doc = json!({
        "nodes": [{"id": "a", "routePath": "/a", "position": {"x": 0.0, "y": 0.0}, "portal": null}],
        "edges": []
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert!(normalized.warnings.is_empty(), "{:?}", normalized.warnings);
}

#[test]
fn missing_route_identity_warns_but_keeps_the_node() {
    let doc = json!({
        "nodes": [{"id": "a", "position": {"x": 0.0, "y": 0.0}}],
        "edges": []
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 1, "{:?}", normalized.warnings);
    assert!(normalized.warnings[0].contains("neither routePath nor routeId"));
    assert_eq!(normalized.spec.nodes.len(), 1);
}

#[test]
fn step_screen_inherits_the_host_path_from_the_node() {
    let doc = json!({
        "nodes": [{"id": "a", "kind": "stepScreen", "routePath": "/intro",
                   "position": {"x": 0.0, "y": 0.0},
                   "stepScreen": {"stepKey": "warmup"}}],
        "edges": []
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert!(normalized.warnings.is_empty(), "{:?}", normalized.warnings);
    let step = normalized.spec.nodes[0].step_screen.as_ref().unwrap();
    assert_eq!(step.host_route_path, "/intro");
}

#[test]
fn step_screen_without_key_is_dropped_silently() {
    let doc = json!({
        "nodes": [{"id": "a", "routePath": "/intro", "position": {"x": 0.0, "y": 0.0},
                   "stepScreen": {"hostRoutePath": "/intro"}}],
        "edges": []
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert!(normalized.warnings.is_empty(), "{:?}", normalized.warnings);
    assert!(normalized.spec.nodes[0].step_screen.is_none());
}

#[test]
fn malformed_internal_step_is_skipped_with_a_warning() {
    let doc = json!({
        "nodes": [{"id": "a", "routePath": "/a", "position": {"x": 0.0, "y": 0.0},
                   "internalSteps": [5, {"id": "s1"}]}],
        "edges": []
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 1, "{:?}", normalized.warnings);
    assert!(normalized.warnings[0].contains("internal step at index 0"));
    let steps = &normalized.spec.nodes[0].internal_steps;
    assert_eq!(steps.len(), 1);
    // Label synthesized from the id when absent.
    assert_eq!(steps[0].label, "s1");
}

#[test]
fn chunk_entries_without_id_are_dropped_never_renumbered() {
    let doc = json!({
        "nodes": [],
        "edges": [],
        "chunks": [{"title": "Mystery"}, 5]
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 2, "{:?}", normalized.warnings);
    assert!(normalized.warnings.iter().any(|w| w.contains("has no id")));
    assert!(normalized.warnings.iter().any(|w| w.contains("not an object")));
    // Only the sentinel survives.
    assert_eq!(normalized.spec.chunks.len(), 1);
    assert_eq!(normalized.spec.chunks[0].id, UNGROUPED_CHUNK_ID);
}

#[test]
fn malformed_overlay_step_is_dropped_with_one_warning() {
    let doc = json!({
        "nodes": [],
        "edges": [],
        "overlays": [{"id": "j", "steps": [42]}]
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 1, "{:?}", normalized.warnings);
    assert!(normalized.warnings[0].contains("step at index 0 is malformed"));
    assert!(normalized.spec.overlays[0].steps.is_empty());
}

#[test]
fn overlay_step_without_node_id_is_dropped() {
    let doc = json!({
        "nodes": [],
        "edges": [],
        "overlays": [{"id": "j", "steps": [{"urlPattern": "/x"}]}]
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 1, "{:?}", normalized.warnings);
    assert!(normalized.warnings[0].contains("has no nodeId"));
}

#[test]
fn overlay_step_with_unknown_node_is_kept_with_a_warning() {
    let doc = json!({
        "nodes": [],
        "edges": [],
        "overlays": [{"id": "j", "steps": [{"nodeId": "ghost"}]}]
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 1, "{:?}", normalized.warnings);
    assert!(normalized.warnings[0].contains("unknown node 'ghost'"));
    // Journeys may be authored before their nodes: the step survives.
    assert_eq!(normalized.spec.overlays[0].steps.len(), 1);
}

#[test]
fn overlay_without_steps_array_warns_and_keeps_the_overlay() {
    let doc = json!({
        "nodes": [],
        "edges": [],
        "overlays": [{"id": "j", "name": "Journey"}]
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 1, "{:?}", normalized.warnings);
    assert!(normalized.warnings[0].contains("no steps array"));
    assert_eq!(normalized.spec.overlays.len(), 1);
}

#[test]
fn overlay_with_unknown_status_falls_back_to_draft() {
    let doc = json!({
        "nodes": [],
        "edges": [],
        "overlays": [{"id": "j", "status": "paused", "steps": []}]
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 1, "{:?}", normalized.warnings);
    assert!(normalized.warnings[0].contains("unknown status 'paused'"));
    assert_eq!(
        normalized.spec.overlays[0].status,
        flowspec::model::OverlayStatus::Draft
    );
}

#[test]
fn overlay_edge_without_endpoints_is_dropped() {
    let doc = json!({
        "nodes": [],
        "edges": [],
        "overlays": [{"id": "j", "steps": [], "edges": [{"fromNodeId": "a"}]}]
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 1, "{:?}", normalized.warnings);
    assert!(normalized.warnings[0].contains("missing endpoints"));
    assert!(normalized.spec.overlays[0].edges.is_empty());
}

#[test]
fn comment_with_unresolved_target_is_dropped() {
    let doc = json!({
        "nodes": [{"id": "a", "routePath": "/a", "position": {"x": 0.0, "y": 0.0}}],
        "edges": [],
        "comments": [{"id": "c1", "targetType": "node", "targetId": "ghost", "message": "hi"}]
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 1, "{:?}", normalized.warnings);
    assert!(normalized.warnings[0].contains("unknown target 'ghost'"));
    assert!(normalized.spec.comments.is_empty());
}

#[test]
fn comment_missing_required_fields_is_dropped() {
    let doc = json!({
        "nodes": [],
        "edges": [],
        "comments": [{"id": "c2", "targetType": "node"}]
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert_eq!(normalized.warnings.len(), 1, "{:?}", normalized.warnings);
    assert!(normalized.warnings[0].contains("targetType/targetId/message"));
}

#[test]
fn comment_timestamps_are_never_generated() {
    let doc = json!({
        "nodes": [{"id": "a", "routePath": "/a", "position": {"x": 0.0, "y": 0.0}}],
        "edges": [],
        "comments": [{"id": "c1", "targetType": "node", "targetId": "a", "message": "hi"}]
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert!(normalized.warnings.is_empty(), "{:?}", normalized.warnings);
    assert!(normalized.spec.comments[0].created_at.is_none());
}

#[test]
fn missing_node_ids_default_positionally() {
    let doc = json!({
        "nodes": [{"routePath": "/a", "position": {"x": 0.0, "y": 0.0}}],
        "edges": [{"source": "node_0", "target": "node_0"}]
    });
    let normalized = normalize_spec_value(&doc).unwrap();
    assert!(normalized.warnings.is_empty(), "{:?}", normalized.warnings);
    assert_eq!(normalized.spec.nodes[0].id, "node_0");
    assert_eq!(normalized.spec.edges[0].id, "edge_0");
}
