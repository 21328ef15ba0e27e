use flowspec::{journeys::build_journeys, loader::parse_spec_text, model::OverlayStatus};

#[test]
fn fixture_exports_one_complete_journey() {
    let text = std::fs::read_to_string("fixtures/guided_day1.json").unwrap();
    let spec = parse_spec_text(&text).unwrap().spec;
    let (journeys, errors) = build_journeys(&spec.overlays);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(journeys.len(), 1);

    let journey = &journeys[0];
    assert_eq!(journey.id, "j_day1");
    assert_eq!(journey.status, OverlayStatus::Active);
    assert_eq!(journey.entry_route_path.as_deref(), Some("/welcome"));
    let orders: Vec<usize> = journey.steps.iter().map(|s| s.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert_eq!(journey.steps[1].gate_tag.as_deref(), Some("tier:free"));
}

#[test]
fn active_journey_with_missing_contract_fields_reports_errors() {
    let spec = parse_spec_text(
        r#"{"nodes": [{"id": "a", "routePath": "/a", "position": {"x": 0, "y": 0}}],
            "edges": [],
            "overlays": [{"id": "j", "status": "active", "steps": [{"nodeId": "a"}]}]}"#,
    )
    .unwrap()
    .spec;
    let (journeys, errors) = build_journeys(&spec.overlays);
    assert_eq!(journeys.len(), 1);
    assert_eq!(errors.len(), 3, "{errors:?}");
    assert!(errors.iter().any(|e| e.contains("entryRoutePath")));
    assert!(errors.iter().any(|e| e.contains("exitRoutePath")));
    assert!(errors.iter().any(|e| e.contains("incomplete contract at step 1")));
}

#[test]
fn draft_journeys_export_without_validation() {
    let spec = parse_spec_text(
        r#"{"nodes": [{"id": "a", "routePath": "/a", "position": {"x": 0, "y": 0}}],
            "edges": [],
            "overlays": [{"id": "j", "steps": [{"nodeId": "a"}]}]}"#,
    )
    .unwrap()
    .spec;
    let (journeys, errors) = build_journeys(&spec.overlays);
    assert_eq!(journeys.len(), 1);
    assert!(errors.is_empty());
    assert_eq!(journeys[0].status, OverlayStatus::Draft);
}
