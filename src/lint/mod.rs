mod coverage;
mod overlays;
mod routes;
mod steps;

pub use coverage::{ChunkStats, chunk_stats, reachable_node_ids};
pub use routes::is_portal;
pub use steps::{StepEdge, StepManifest, StepRef, diagnose_step_flows, host_route_paths, step_manifest};

use crate::{
    model::{FlowChunk, FlowEdge, FlowNode, FlowOverlay, FlowSpec, UNGROUPED_CHUNK_ID},
    registry::RouteIndex,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetKind {
    Node,
    Edge,
    StepNode,
    Chunk,
    Overlay,
}

/// A reported structural problem: severity, human-readable message and a
/// pointer back to the offending graph element. Issue ids are derived from
/// the element so re-runs produce the same id for the same problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowIssue {
    pub id: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<TargetKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
}

impl FlowIssue {
    pub fn info(id: impl Into<String>, message: impl Into<String>) -> Self {
        FlowIssue {
            id: id.into(),
            message: message.into(),
            severity: Severity::Info,
            target_type: None,
            target_id: None,
        }
    }

    pub fn warning(id: impl Into<String>, message: impl Into<String>) -> Self {
        FlowIssue {
            id: id.into(),
            message: message.into(),
            severity: Severity::Warning,
            target_type: None,
            target_id: None,
        }
    }

    pub fn with_target(mut self, kind: TargetKind, target_id: impl Into<String>) -> Self {
        self.target_type = Some(kind);
        self.target_id = Some(target_id.into());
        self
    }
}

/// Run every structural check against the graph. Pure: never mutates its
/// inputs, returns an empty list for a clean graph. `route_index` is the
/// optional external route registry; when absent, route-sync checks are
/// skipped. Chunk and overlay checks only run when those lists are supplied.
pub fn diagnose(
    nodes: &[FlowNode],
    edges: &[FlowEdge],
    route_index: Option<&RouteIndex>,
    chunks: Option<&[FlowChunk]>,
    overlays: Option<&[FlowOverlay]>,
) -> Vec<FlowIssue> {
    let mut issues = Vec::new();

    if nodes.is_empty() {
        issues.push(FlowIssue::warning("empty-flow", "graph has no nodes"));
        return issues;
    }

    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    // Stale edges left behind by node deletions.
    for edge in edges {
        if !node_ids.contains(edge.source.as_str()) || !node_ids.contains(edge.target.as_str()) {
            issues.push(
                FlowIssue::warning(
                    format!("edge-{}-dangling", edge.id),
                    format!("edge '{}' has a missing endpoint", edge.id),
                )
                .with_target(TargetKind::Edge, &edge.id),
            );
        }
    }

    let mut outgoing: HashMap<&str, usize> = HashMap::new();
    let mut incoming: HashMap<&str, usize> = HashMap::new();
    for edge in edges {
        *outgoing.entry(edge.source.as_str()).or_default() += 1;
        *incoming.entry(edge.target.as_str()).or_default() += 1;
    }

    routes::check_duplicate_routes(nodes, &mut issues);

    for node in nodes {
        routes::check_portal_consistency(node, &mut issues);

        if let Some(index) = route_index
            && let Some(route_id) = &node.route_id
            && !index.contains(route_id)
        {
            issues.push(
                FlowIssue::warning(
                    format!("route-missing-{}", node.id),
                    format!(
                        "route for node '{}' is out of sync with the route registry",
                        node.display_label()
                    ),
                )
                .with_target(TargetKind::Node, &node.id),
            );
        }

        if node.chunk_id == UNGROUPED_CHUNK_ID {
            issues.push(
                FlowIssue::warning(
                    format!("chunk-missing-{}", node.id),
                    format!("node '{}' is not assigned to any chunk", node.display_label()),
                )
                .with_target(TargetKind::Node, &node.id),
            );
        }

        if nodes.len() > 1 {
            if outgoing.get(node.id.as_str()).copied().unwrap_or(0) == 0 {
                issues.push(
                    FlowIssue::warning(
                        format!("dangling-{}", node.id),
                        format!("node '{}' has no outgoing transitions", node.display_label()),
                    )
                    .with_target(TargetKind::Node, &node.id),
                );
            }
            if incoming.get(node.id.as_str()).copied().unwrap_or(0) == 0 {
                issues.push(
                    FlowIssue::info(
                        format!("orphan-{}", node.id),
                        format!("node '{}' has no incoming transitions", node.display_label()),
                    )
                    .with_target(TargetKind::Node, &node.id),
                );
            }
        }
    }

    if let Some(chunks) = chunks {
        coverage::check_chunk_coverage(nodes, edges, chunks, &mut issues);
    }
    if let Some(overlays) = overlays {
        overlays::check_overlays(overlays, &node_ids, &mut issues);
    }

    tracing::debug!(issues = issues.len(), "diagnosed flow graph");
    issues
}

/// Diagnose a normalized spec, feeding its own chunk and overlay lists.
pub fn diagnose_spec(spec: &FlowSpec, route_index: Option<&RouteIndex>) -> Vec<FlowIssue> {
    diagnose(
        &spec.nodes,
        &spec.edges,
        route_index,
        Some(&spec.chunks),
        Some(&spec.overlays),
    )
}
