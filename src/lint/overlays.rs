use super::{FlowIssue, TargetKind};
use crate::model::FlowOverlay;
use std::collections::HashSet;

/// Journeys with no steps are flagged as informational; steps pointing at
/// nodes absent from the current graph are warnings.
pub(super) fn check_overlays(
    overlays: &[FlowOverlay],
    node_ids: &HashSet<&str>,
    issues: &mut Vec<FlowIssue>,
) {
    for overlay in overlays {
        let journey = overlay.name.as_deref().unwrap_or(&overlay.id);
        if overlay.steps.is_empty() {
            issues.push(
                FlowIssue::info(
                    format!("overlay-{}-empty", overlay.id),
                    format!("journey '{journey}' has no steps"),
                )
                .with_target(TargetKind::Overlay, &overlay.id),
            );
            continue;
        }
        for (index, step) in overlay.steps.iter().enumerate() {
            if !node_ids.contains(step.node_id.as_str()) {
                issues.push(
                    FlowIssue::warning(
                        format!("overlay-{}-step-{}-missing", overlay.id, index),
                        format!(
                            "journey '{journey}' step {} references missing node '{}'",
                            index + 1,
                            step.node_id
                        ),
                    )
                    .with_target(TargetKind::Overlay, &overlay.id),
                );
            }
        }
    }
}
