use super::{FlowIssue, TargetKind};
use crate::model::{FlowEdge, FlowNode, NodeKind};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRef {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// The ordered step graph of one host route, derived from its `stepScreen`
/// nodes and the main edge set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepManifest {
    pub route_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_step: Option<String>,
    pub terminal_steps: Vec<String>,
    pub steps: Vec<StepRef>,
    pub edges: Vec<StepEdge>,
}

/// Distinct host route paths that own step screens, in document order.
pub fn host_route_paths(nodes: &[FlowNode]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for node in nodes {
        if node.kind != NodeKind::StepScreen {
            continue;
        }
        if let Some(step) = &node.step_screen
            && seen.insert(step.host_route_path.clone())
        {
            paths.push(step.host_route_path.clone());
        }
    }
    paths
}

/// Derive the step manifest for one host route. Returns `None` when the
/// route hosts no step screens. The start step is the target of an edge
/// leaving the host route node, falling back to the first step without
/// incoming step edges, falling back to the first step.
pub fn step_manifest(
    nodes: &[FlowNode],
    edges: &[FlowEdge],
    host_route_path: &str,
) -> Option<StepManifest> {
    let step_nodes: Vec<&FlowNode> = nodes
        .iter()
        .filter(|n| {
            n.kind == NodeKind::StepScreen
                && n.step_screen
                    .as_ref()
                    .is_some_and(|s| s.host_route_path == host_route_path)
        })
        .collect();
    if step_nodes.is_empty() {
        return None;
    }

    let by_id: HashMap<&str, &FlowNode> =
        step_nodes.iter().map(|n| (n.id.as_str(), *n)).collect();
    let steps: Vec<StepRef> = step_nodes
        .iter()
        .map(|node| StepRef {
            key: step_key(node),
            label: step_label(node),
        })
        .collect();

    let mut manifest_edges = Vec::new();
    for edge in edges {
        let (Some(source_node), Some(target_node)) = (
            by_id.get(edge.source.as_str()),
            by_id.get(edge.target.as_str()),
        ) else {
            continue;
        };
        manifest_edges.push(StepEdge {
            id: edge.id.clone(),
            source: step_key(source_node),
            target: step_key(target_node),
        });
    }

    let mut incoming: HashMap<&str, usize> = HashMap::new();
    let mut outgoing: HashMap<&str, usize> = HashMap::new();
    for edge in &manifest_edges {
        *incoming.entry(edge.target.as_str()).or_default() += 1;
        *outgoing.entry(edge.source.as_str()).or_default() += 1;
    }

    let host_node = nodes
        .iter()
        .find(|n| n.kind != NodeKind::StepScreen && n.route_path.as_deref() == Some(host_route_path));
    let mut start_step = host_node.and_then(|host| {
        edges.iter().find_map(|edge| {
            if edge.source != host.id {
                return None;
            }
            by_id.get(edge.target.as_str()).map(|node| step_key(node))
        })
    });
    if start_step.is_none() {
        start_step = steps
            .iter()
            .find(|step| incoming.get(step.key.as_str()).copied().unwrap_or(0) == 0)
            .map(|step| step.key.clone())
            .or_else(|| steps.first().map(|step| step.key.clone()));
    }

    let terminal_steps: Vec<String> = steps
        .iter()
        .filter(|step| outgoing.get(step.key.as_str()).copied().unwrap_or(0) == 0)
        .map(|step| step.key.clone())
        .collect();

    Some(StepManifest {
        route_path: host_route_path.to_string(),
        start_step,
        terminal_steps,
        steps,
        edges: manifest_edges,
    })
}

/// Diagnose every host route's step flow: missing start, unreachable steps
/// and non-terminal dead ends.
pub fn diagnose_step_flows(nodes: &[FlowNode], edges: &[FlowEdge]) -> Vec<FlowIssue> {
    let mut issues = Vec::new();
    for host_route_path in host_route_paths(nodes) {
        let Some(manifest) = step_manifest(nodes, edges, &host_route_path) else {
            continue;
        };
        let host_node_id = nodes
            .iter()
            .find(|n| {
                n.kind != NodeKind::StepScreen && n.route_path.as_deref() == Some(host_route_path.as_str())
            })
            .map(|n| n.id.clone())
            .unwrap_or_else(|| host_route_path.clone());
        diagnose_manifest(&manifest, &host_node_id, &mut issues);
    }
    issues
}

fn diagnose_manifest(manifest: &StepManifest, host_node_id: &str, issues: &mut Vec<FlowIssue>) {
    let start = manifest
        .start_step
        .clone()
        .or_else(|| manifest.steps.first().map(|step| step.key.clone()));
    let Some(start) = start else {
        issues.push(
            FlowIssue::warning(
                format!("{host_node_id}-step-no-start"),
                "step flow missing explicit start",
            )
            .with_target(
                TargetKind::StepNode,
                step_node_target(host_node_id, "unknown"),
            ),
        );
        return;
    };

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut outgoing: HashMap<&str, usize> = HashMap::new();
    for edge in &manifest.edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        *outgoing.entry(edge.source.as_str()).or_default() += 1;
    }

    let mut reachable: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::from([start.as_str()]);
    while let Some(current) = queue.pop_front() {
        if !reachable.insert(current) {
            continue;
        }
        if let Some(neighbors) = adjacency.get(current) {
            for neighbor in neighbors {
                if !reachable.contains(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
    }

    for step in &manifest.steps {
        if !reachable.contains(step.key.as_str()) {
            issues.push(
                FlowIssue::warning(
                    format!("{host_node_id}-step-unreachable-{}", step.key),
                    format!("step '{}' is unreachable", step.label),
                )
                .with_target(
                    TargetKind::StepNode,
                    step_node_target(host_node_id, &step.key),
                ),
            );
        }
    }

    let mut terminals: HashSet<&str> = manifest
        .terminal_steps
        .iter()
        .map(String::as_str)
        .collect();
    if terminals.is_empty() {
        for step in &manifest.steps {
            if outgoing.get(step.key.as_str()).copied().unwrap_or(0) == 0 && step.key != start {
                terminals.insert(step.key.as_str());
            }
        }
    }
    for step in &manifest.steps {
        let exits = outgoing.get(step.key.as_str()).copied().unwrap_or(0);
        if exits == 0 && !terminals.contains(step.key.as_str()) {
            issues.push(
                FlowIssue::warning(
                    format!("{host_node_id}-step-deadend-{}", step.key),
                    format!("step '{}' has no exit", step.label),
                )
                .with_target(
                    TargetKind::StepNode,
                    step_node_target(host_node_id, &step.key),
                ),
            );
        }
    }
}

fn step_node_target(host_node_id: &str, step_key: &str) -> String {
    format!("step:{host_node_id}:{step_key}")
}

fn step_key(node: &FlowNode) -> String {
    node.step_screen
        .as_ref()
        .map(|s| s.step_key.clone())
        .unwrap_or_else(|| node.id.clone())
}

fn step_label(node: &FlowNode) -> String {
    node.step_screen
        .as_ref()
        .and_then(|s| s.label.clone())
        .or_else(|| node.label.first().map(str::to_string))
        .unwrap_or_else(|| node.id.clone())
}
