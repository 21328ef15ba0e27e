use crate::model::{FlowOverlay, OverlayStatus, OverlayStep};
use serde::Serialize;

/// One exported journey step, 1-based ordered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyStep {
    pub order: usize,
    pub node_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assert_test_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_test_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate_tag: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Journey fixture consumed by end-to-end tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: OverlayStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_route_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_route_path: Option<String>,
    pub steps: Vec<JourneyStep>,
}

/// Convert overlays into journey fixtures. Active journeys must declare
/// entry/exit route paths and a complete per-step test contract; violations
/// come back as contract errors alongside the fixtures.
pub fn build_journeys(overlays: &[FlowOverlay]) -> (Vec<Journey>, Vec<String>) {
    let mut errors = Vec::new();
    let journeys = overlays
        .iter()
        .map(|overlay| {
            validate_journey(overlay, &mut errors);
            Journey {
                id: overlay.id.clone(),
                name: overlay.name.clone(),
                status: overlay.status,
                entry_route_path: overlay.entry_route_path.clone(),
                exit_route_path: overlay.exit_route_path.clone(),
                steps: overlay
                    .steps
                    .iter()
                    .enumerate()
                    .map(|(index, step)| journey_step(step, index + 1))
                    .collect(),
            }
        })
        .collect();
    (journeys, errors)
}

fn journey_step(step: &OverlayStep, order: usize) -> JourneyStep {
    JourneyStep {
        order,
        node_id: step.node_id.clone(),
        url_pattern: step.url_pattern.clone(),
        assert_test_id: step.assert_test_id.clone(),
        click_test_id: step.click_test_id.clone(),
        gate_tag: step.gate_tag.clone(),
        tags: step.tags.clone(),
    }
}

fn validate_journey(overlay: &FlowOverlay, errors: &mut Vec<String>) {
    if overlay.status != OverlayStatus::Active {
        return;
    }
    let journey = overlay.name.as_deref().unwrap_or(&overlay.id);
    if overlay.entry_route_path.is_none() {
        errors.push(format!("active journey '{journey}' has no entryRoutePath"));
    }
    if overlay.exit_route_path.is_none() {
        errors.push(format!("active journey '{journey}' has no exitRoutePath"));
    }
    for (index, step) in overlay.steps.iter().enumerate() {
        if step.url_pattern.is_none()
            || step.assert_test_id.is_none()
            || step.click_test_id.is_none()
        {
            errors.push(format!(
                "active journey '{journey}' has an incomplete contract at step {} (node '{}')",
                index + 1,
                step.node_id
            ));
        }
    }
}
