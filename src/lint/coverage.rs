use super::{FlowIssue, TargetKind};
use crate::model::{FlowChunk, FlowEdge, FlowNode, START_TAG, UNGROUPED_CHUNK_ID};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// For every authored chunk that owns nodes, check that it has an entry
/// point (a `start`-tagged node) and at least one edge leaving it for
/// another chunk.
pub(super) fn check_chunk_coverage(
    nodes: &[FlowNode],
    edges: &[FlowEdge],
    chunks: &[FlowChunk],
    issues: &mut Vec<FlowIssue>,
) {
    let node_chunk: HashMap<&str, &str> = nodes
        .iter()
        .map(|n| (n.id.as_str(), n.chunk_id.as_str()))
        .collect();

    let mut totals: HashMap<&str, usize> = HashMap::new();
    let mut starts: HashMap<&str, usize> = HashMap::new();
    for node in nodes {
        *totals.entry(node.chunk_id.as_str()).or_default() += 1;
        if node.has_tag(START_TAG) {
            *starts.entry(node.chunk_id.as_str()).or_default() += 1;
        }
    }

    let mut has_exit: HashSet<&str> = HashSet::new();
    for edge in edges {
        if let (Some(source_chunk), Some(target_chunk)) = (
            node_chunk.get(edge.source.as_str()),
            node_chunk.get(edge.target.as_str()),
        ) && source_chunk != target_chunk
        {
            has_exit.insert(*source_chunk);
        }
    }

    for chunk in chunks {
        if chunk.id == UNGROUPED_CHUNK_ID {
            continue;
        }
        if totals.get(chunk.id.as_str()).copied().unwrap_or(0) == 0 {
            continue;
        }
        if starts.get(chunk.id.as_str()).copied().unwrap_or(0) == 0 {
            issues.push(
                FlowIssue::info(
                    format!("chunk-{}-no-entry", chunk.id),
                    format!("chunk '{}' has no entry point", chunk.title),
                )
                .with_target(TargetKind::Chunk, &chunk.id),
            );
        }
        if !has_exit.contains(chunk.id.as_str()) {
            issues.push(
                FlowIssue::info(
                    format!("chunk-{}-no-exit", chunk.id),
                    format!("chunk '{}' has no exit to other chunks", chunk.title),
                )
                .with_target(TargetKind::Chunk, &chunk.id),
            );
        }
    }
}

/// Per-chunk node counters surfaced to editor consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChunkStats {
    pub total: usize,
    pub start: usize,
    pub unreachable: usize,
}

/// Count total, start-tagged and unreachable nodes per chunk. Every chunk in
/// `chunks` gets an entry, even when empty.
pub fn chunk_stats(
    nodes: &[FlowNode],
    edges: &[FlowEdge],
    chunks: &[FlowChunk],
) -> IndexMap<String, ChunkStats> {
    let reachable = reachable_node_ids(nodes, edges);
    let mut stats: IndexMap<String, ChunkStats> = chunks
        .iter()
        .map(|chunk| (chunk.id.clone(), ChunkStats::default()))
        .collect();
    for node in nodes {
        let entry = stats.entry(node.chunk_id.clone()).or_default();
        entry.total += 1;
        if node.has_tag(START_TAG) {
            entry.start += 1;
        }
        if !reachable.contains(node.id.as_str()) {
            entry.unreachable += 1;
        }
    }
    stats
}

/// Breadth-first reachability. Seeds are the `start`-tagged nodes, falling
/// back to nodes without incoming edges, falling back to the first node.
pub fn reachable_node_ids<'a>(nodes: &'a [FlowNode], edges: &'a [FlowEdge]) -> HashSet<&'a str> {
    let mut incoming: HashMap<&str, usize> = HashMap::new();
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        *incoming.entry(edge.target.as_str()).or_default() += 1;
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut seeds: Vec<&str> = nodes
        .iter()
        .filter(|n| n.has_tag(START_TAG))
        .map(|n| n.id.as_str())
        .collect();
    if seeds.is_empty() {
        seeds = nodes
            .iter()
            .filter(|n| incoming.get(n.id.as_str()).copied().unwrap_or(0) == 0)
            .map(|n| n.id.as_str())
            .collect();
    }
    if seeds.is_empty() && !nodes.is_empty() {
        seeds = vec![nodes[0].id.as_str()];
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = seeds.into_iter().collect();
    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        if let Some(neighbors) = adjacency.get(current) {
            for neighbor in neighbors {
                if !visited.contains(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
    }
    visited
}
