use flowspec::{
    diagnose,
    lint::{Severity, TargetKind, chunk_stats},
    loader::parse_spec_text,
    model::{FlowSpec, UNGROUPED_CHUNK_ID},
};

fn spec(text: &str) -> FlowSpec {
    parse_spec_text(text).unwrap().spec
}

#[test]
fn chunk_without_entry_or_exit_gets_two_informational_issues() {
    let spec = spec(
        r#"{"nodes": [
            {"id": "a", "routePath": "/a", "chunkId": "intro", "position": {"x": 0, "y": 0}},
            {"id": "b", "routePath": "/b", "chunkId": "intro", "position": {"x": 100, "y": 0}}
        ], "edges": [{"id": "e", "source": "a", "target": "b"}],
        "chunks": [{"id": "intro", "title": "Intro", "order": 1}]}"#,
    );
    let issues = diagnose(&spec.nodes, &spec.edges, None, Some(&spec.chunks), None);
    let chunk_issues: Vec<_> = issues
        .iter()
        .filter(|i| i.id.starts_with("chunk-intro-"))
        .collect();
    assert_eq!(chunk_issues.len(), 2);
    assert!(chunk_issues.iter().all(|i| i.severity == Severity::Info));
    assert!(chunk_issues
        .iter()
        .all(|i| i.target_type == Some(TargetKind::Chunk)));
    assert!(chunk_issues.iter().any(|i| i.id == "chunk-intro-no-entry"));
    assert!(chunk_issues.iter().any(|i| i.id == "chunk-intro-no-exit"));
}

#[test]
fn chunk_with_entry_and_exit_is_clean() {
    let spec = spec(
        r#"{"nodes": [
            {"id": "a", "routePath": "/a", "chunkId": "intro", "tags": ["start"],
             "position": {"x": 0, "y": 0}},
            {"id": "b", "routePath": "/b", "chunkId": "loop", "position": {"x": 100, "y": 0}}
        ], "edges": [{"id": "e", "source": "a", "target": "b"}],
        "chunks": [
            {"id": "intro", "title": "Intro", "order": 1},
            {"id": "loop", "title": "Loop", "order": 2}
        ]}"#,
    );
    let issues = diagnose(&spec.nodes, &spec.edges, None, Some(&spec.chunks), None);
    assert!(!issues.iter().any(|i| i.id.starts_with("chunk-intro-")));
}

#[test]
fn empty_chunks_and_the_sentinel_are_skipped() {
    let spec = spec(
        r#"{"nodes": [
            {"id": "a", "routePath": "/a", "position": {"x": 0, "y": 0}}
        ], "edges": [],
        "chunks": [{"id": "intro", "title": "Intro", "order": 1}]}"#,
    );
    let issues = diagnose(&spec.nodes, &spec.edges, None, Some(&spec.chunks), None);
    // "intro" owns no node; "ungrouped" owns one but is the sentinel.
    assert!(!issues.iter().any(|i| i.id.starts_with("chunk-intro-")));
    assert!(!issues.iter().any(|i| i.id.starts_with("chunk-ungrouped-")));
}

#[test]
fn chunk_checks_only_run_when_chunks_are_supplied() {
    let spec = spec(
        r#"{"nodes": [
            {"id": "a", "routePath": "/a", "chunkId": "intro", "position": {"x": 0, "y": 0}}
        ], "edges": [],
        "chunks": [{"id": "intro", "title": "Intro", "order": 1}]}"#,
    );
    let issues = diagnose(&spec.nodes, &spec.edges, None, None, None);
    assert!(!issues.iter().any(|i| i.id.starts_with("chunk-intro-")));
}

#[test]
fn empty_overlay_is_informational() {
    let spec = spec(
        r#"{"nodes": [{"id": "a", "routePath": "/a", "position": {"x": 0, "y": 0}}],
            "edges": [],
            "overlays": [{"id": "j", "name": "Journey", "steps": []}]}"#,
    );
    let issues = diagnose(&spec.nodes, &spec.edges, None, None, Some(&spec.overlays));
    let empty: Vec<_> = issues.iter().filter(|i| i.id == "overlay-j-empty").collect();
    assert_eq!(empty.len(), 1);
    assert_eq!(empty[0].severity, Severity::Info);
    assert_eq!(empty[0].target_type, Some(TargetKind::Overlay));
}

#[test]
fn overlay_step_referencing_missing_node_is_a_warning() {
    let spec = spec(
        r#"{"nodes": [{"id": "a", "routePath": "/a", "position": {"x": 0, "y": 0}}],
            "edges": [],
            "overlays": [{"id": "j", "steps": [
                {"nodeId": "a"},
                {"nodeId": "ghost"}
            ]}]}"#,
    );
    let issues = diagnose(&spec.nodes, &spec.edges, None, None, Some(&spec.overlays));
    let broken: Vec<_> = issues
        .iter()
        .filter(|i| i.id.starts_with("overlay-j-step-"))
        .collect();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].id, "overlay-j-step-1-missing");
    assert_eq!(broken[0].severity, Severity::Warning);
    assert!(broken[0].message.contains("ghost"));
}

#[test]
fn chunk_stats_count_start_and_unreachable_nodes() {
    let spec = spec(
        r#"{"nodes": [
            {"id": "a", "routePath": "/a", "chunkId": "intro", "tags": ["start"],
             "position": {"x": 0, "y": 0}},
            {"id": "b", "routePath": "/b", "chunkId": "intro", "position": {"x": 100, "y": 0}},
            {"id": "c", "routePath": "/c", "chunkId": "loop", "position": {"x": 200, "y": 0}}
        ], "edges": [{"id": "e", "source": "a", "target": "b"}],
        "chunks": [
            {"id": "intro", "title": "Intro", "order": 1},
            {"id": "loop", "title": "Loop", "order": 2}
        ]}"#,
    );
    let stats = chunk_stats(&spec.nodes, &spec.edges, &spec.chunks);
    let intro = &stats["intro"];
    assert_eq!((intro.total, intro.start, intro.unreachable), (2, 1, 0));
    // "c" is disconnected from the start seed.
    let loop_stats = &stats["loop"];
    assert_eq!((loop_stats.total, loop_stats.start, loop_stats.unreachable), (1, 0, 1));
    // Every chunk gets an entry, even when empty.
    assert_eq!(stats[UNGROUPED_CHUNK_ID].total, 0);
}
