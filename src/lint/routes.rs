use super::{FlowIssue, TargetKind};
use crate::{
    model::{FlowNode, NodeKind, PORTAL_LABEL_PREFIX, PORTAL_TAG, PortalTarget},
    util::PORTAL_LABEL_RE,
};
use std::collections::HashMap;

/// A node counts as a portal when it carries the `type:portal` tag or its
/// display label follows the `PORTAL:` naming convention. Both signals are
/// honored independently; check_portal_consistency flags the mismatches.
pub fn is_portal(node: &FlowNode) -> bool {
    node.has_tag(PORTAL_TAG) || has_portal_label(node)
}

fn has_portal_label(node: &FlowNode) -> bool {
    PORTAL_LABEL_RE.is_match(node.display_label())
}

/// Group nodes by their effective route key and warn once per node in every
/// bucket mapped by more than one node. Portals are exempt (they point
/// elsewhere), as are step screens (they live inside their host route and
/// would always collide with it).
pub(super) fn check_duplicate_routes(nodes: &[FlowNode], issues: &mut Vec<FlowIssue>) {
    let mut buckets: HashMap<&str, usize> = HashMap::new();
    for node in nodes {
        if is_portal(node) || node.kind == NodeKind::StepScreen {
            continue;
        }
        if let Some(key) = node.route_key() {
            *buckets.entry(key).or_default() += 1;
        }
    }
    for node in nodes {
        if is_portal(node) || node.kind == NodeKind::StepScreen {
            continue;
        }
        let Some(key) = node.route_key() else {
            continue;
        };
        let count = buckets[key];
        if count > 1 {
            issues.push(
                FlowIssue::warning(
                    format!("duplicate-route-{}", node.id),
                    format!("route '{key}' is mapped by {count} nodes"),
                )
                .with_target(TargetKind::Node, &node.id),
            );
        }
    }
}

pub(super) fn check_portal_consistency(node: &FlowNode, issues: &mut Vec<FlowIssue>) {
    let tagged = node.has_tag(PORTAL_TAG);
    let labeled = has_portal_label(node);

    if tagged && !labeled {
        // Style only: the tag already makes the node a recognized portal.
        issues.push(
            FlowIssue::info(
                format!("portal-label-style-{}", node.id),
                format!(
                    "portal node '{}' does not follow the '{PORTAL_LABEL_PREFIX}' label convention",
                    node.display_label()
                ),
            )
            .with_target(TargetKind::Node, &node.id),
        );
    }
    if labeled && !tagged {
        // Real gap: consumers keying on the tag alone will not treat this
        // node as a portal.
        issues.push(
            FlowIssue::warning(
                format!("portal-tag-missing-{}", node.id),
                format!(
                    "node '{}' looks like a portal but lacks the '{PORTAL_TAG}' tag",
                    node.display_label()
                ),
            )
            .with_target(TargetKind::Node, &node.id),
        );
    }
    if (tagged || labeled)
        && !node
            .portal
            .as_ref()
            .is_some_and(PortalTarget::is_resolved)
    {
        issues.push(
            FlowIssue::warning(
                format!("portal-target-missing-{}", node.id),
                format!(
                    "portal node '{}' has no resolved route or node target",
                    node.display_label()
                ),
            )
            .with_target(TargetKind::Node, &node.id),
        );
    }
}
