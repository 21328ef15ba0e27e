use crate::{
    chunks::{CanonicalChunks, ChunkProvider},
    error::{ErrorLocation, Result, SpecError},
    model::{
        ChunkMeta, CommentTargetKind, FlowChunk, FlowComment, FlowEdge, FlowIdentity, FlowNode,
        FlowOverlay, FlowSpec, InternalStep, LabelMap, MenuState, NodeKind, NormalizedSpec,
        OverlayEdge, OverlayStatus, OverlayStep, PortalTarget, Position, StepScreen, START_TAG,
        UNGROUPED_CHUNK_ID,
    },
    util::{
        as_object, obj_array, obj_bool, obj_f64, obj_non_empty_str, obj_str, obj_string,
        strict_string_list, string_list,
    },
};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::{collections::HashSet, fs, path::Path};

const INLINE_SOURCE: &str = "<inline>";

/// Parse JSON text into a normalized spec using the default chunk provider.
pub fn parse_spec_text(text: &str) -> Result<NormalizedSpec> {
    parse_spec_text_with_source(text, INLINE_SOURCE)
}

/// Same as [`parse_spec_text`] but lets callers label the source for error
/// locations.
pub fn parse_spec_text_with_source(
    text: &str,
    source_label: impl Into<String>,
) -> Result<NormalizedSpec> {
    parse_internal(text, &CanonicalChunks::new(), &source_label.into(), None)
}

/// Parse JSON text with an explicit chunk defaulting/ordering provider.
pub fn parse_spec_text_with_provider(
    text: &str,
    provider: &dyn ChunkProvider,
    source_label: impl Into<String>,
) -> Result<NormalizedSpec> {
    parse_internal(text, provider, &source_label.into(), None)
}

/// Read a spec file from disk and parse it, threading the path into error
/// locations.
pub fn load_spec_from_path(path: &Path) -> Result<NormalizedSpec> {
    let text = fs::read_to_string(path).map_err(|e| SpecError::Io {
        message: format!("{}: {e}", path.display()),
        location: ErrorLocation::at(path.display().to_string()).with_source_path(Some(path)),
    })?;
    parse_internal(
        &text,
        &CanonicalChunks::new(),
        &path.display().to_string(),
        Some(path),
    )
}

/// Normalize an already-parsed JSON value using the default chunk provider.
pub fn normalize_spec_value(value: &Value) -> Result<NormalizedSpec> {
    normalize_internal(value, &CanonicalChunks::new(), INLINE_SOURCE, None)
}

/// Normalize an already-parsed JSON value with an explicit chunk provider.
pub fn normalize_spec_value_with(
    value: &Value,
    provider: &dyn ChunkProvider,
    source_label: impl Into<String>,
) -> Result<NormalizedSpec> {
    normalize_internal(value, provider, &source_label.into(), None)
}

fn parse_internal(
    text: &str,
    provider: &dyn ChunkProvider,
    source_label: &str,
    source_path: Option<&Path>,
) -> Result<NormalizedSpec> {
    if text.trim().is_empty() {
        return Err(SpecError::EmptyDocument {
            location: loc(source_label, source_path),
        });
    }
    let value: Value = serde_json::from_str(text).map_err(|e| SpecError::Json {
        message: e.to_string(),
        location: loc(source_label, source_path).with_position(e.line(), e.column()),
    })?;
    normalize_internal(&value, provider, source_label, source_path)
}

fn normalize_internal(
    value: &Value,
    provider: &dyn ChunkProvider,
    source_label: &str,
    source_path: Option<&Path>,
) -> Result<NormalizedSpec> {
    let root = match as_object(value) {
        Some(root) => root,
        None => {
            return Err(SpecError::MissingRoot {
                location: loc(source_label, source_path),
            });
        }
    };
    let mut warnings: Vec<String> = Vec::new();

    let flow = normalize_identity(root);
    let nodes_input = obj_array(root, "nodes").ok_or_else(|| SpecError::MissingCollection {
        field: "nodes",
        location: loc(source_label, source_path),
    })?;
    let edges_input = obj_array(root, "edges").ok_or_else(|| SpecError::MissingCollection {
        field: "edges",
        location: loc(source_label, source_path),
    })?;

    let chunks = normalize_chunks(root.get("chunks"), provider, &mut warnings);
    let chunk_ids: HashSet<String> = chunks.iter().map(|c| c.id.clone()).collect();

    let mut nodes = Vec::with_capacity(nodes_input.len());
    for (index, raw) in nodes_input.iter().enumerate() {
        nodes.push(normalize_node(
            raw,
            index,
            &chunk_ids,
            &mut warnings,
            source_label,
            source_path,
        )?);
    }
    let node_ids: HashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();

    let mut edges = Vec::with_capacity(edges_input.len());
    for (index, raw) in edges_input.iter().enumerate() {
        edges.push(normalize_edge(raw, index, source_label, source_path)?);
    }

    let comments = normalize_comments(root.get("comments"), &node_ids, &chunk_ids, &mut warnings);
    let overlays = normalize_overlays(root.get("overlays"), &node_ids, &mut warnings);
    let diagnostics = root.get("diagnostics").and_then(as_object).map(|map| {
        map.iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<IndexMap<String, Value>>()
    });

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        chunks = chunks.len(),
        warnings = warnings.len(),
        "normalized flow spec"
    );

    Ok(NormalizedSpec {
        spec: FlowSpec {
            flow,
            nodes,
            edges,
            chunks,
            comments,
            overlays,
            diagnostics,
        },
        warnings,
    })
}

fn normalize_identity(root: &Map<String, Value>) -> FlowIdentity {
    let Some(flow) = root.get("flow").and_then(as_object) else {
        return FlowIdentity::default();
    };
    FlowIdentity {
        id: obj_string(flow, "id"),
        name: obj_string(flow, "name"),
        version: flow.get("version").and_then(Value::as_i64),
        updated_at: obj_string(flow, "updatedAt"),
    }
}

fn normalize_node(
    raw: &Value,
    index: usize,
    chunk_ids: &HashSet<String>,
    warnings: &mut Vec<String>,
    source_label: &str,
    source_path: Option<&Path>,
) -> Result<FlowNode> {
    let map = as_object(raw).ok_or_else(|| SpecError::NodeShape {
        index,
        location: loc(source_label, source_path).with_pointer(format!("/nodes/{index}")),
    })?;
    let id = obj_non_empty_str(map, "id")
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{index}"));

    let kind = match obj_str(map, "kind") {
        None => NodeKind::Route,
        Some(raw_kind) => NodeKind::parse(raw_kind).unwrap_or_else(|| {
            warnings.push(format!(
                "node '{id}' has unknown kind '{raw_kind}'; treated as route"
            ));
            NodeKind::Route
        }),
    };

    // Position is the one per-node fatal sub-field: a node cannot be placed
    // without it and there is no sane default.
    let position = map
        .get("position")
        .and_then(as_object)
        .and_then(|pos| {
            let x = obj_f64(pos, "x")?;
            let y = obj_f64(pos, "y")?;
            Some(Position { x, y })
        })
        .ok_or_else(|| SpecError::NodePosition {
            node_id: id.clone(),
            location: loc(source_label, source_path)
                .with_pointer(format!("/nodes/{index}/position")),
        })?;

    let own_route_path = obj_non_empty_str(map, "routePath").map(str::to_string);
    let route_id = obj_non_empty_str(map, "routeId").map(str::to_string);
    let label = normalize_label(map.get("label"));
    let is_start = obj_bool(map, "isStart").unwrap_or(false);
    let tags = normalize_tags(
        map.get("tags").map(string_list).unwrap_or_default(),
        is_start,
    );

    let chunk_id = match obj_non_empty_str(map, "chunkId") {
        Some(requested) if chunk_ids.contains(requested) => requested.to_string(),
        Some(requested) => {
            warnings.push(format!(
                "node '{id}' references unknown chunk '{requested}'; moved to ungrouped"
            ));
            UNGROUPED_CHUNK_ID.to_string()
        }
        None => UNGROUPED_CHUNK_ID.to_string(),
    };

    let portal = normalize_portal(map.get("portal"), &id, warnings);
    let step_screen = normalize_step_screen(map.get("stepScreen"), own_route_path.as_deref());

    // Effective route path: step screens live inside their host route.
    let route_path = match &step_screen {
        Some(step) => Some(step.host_route_path.clone()),
        None => own_route_path,
    };
    if route_path.is_none() && route_id.is_none() {
        warnings.push(format!("node '{id}' declares neither routePath nor routeId"));
    }

    let internal_steps = normalize_internal_steps(map.get("internalSteps"), &id, warnings);

    Ok(FlowNode {
        id,
        kind,
        route_id,
        route_path,
        label,
        position,
        is_start,
        tags,
        chunk_id,
        portal,
        step_screen,
        internal_steps,
    })
}

fn normalize_label(value: Option<&Value>) -> LabelMap {
    let mut out = IndexMap::new();
    if let Some(map) = value.and_then(as_object) {
        for (lang, text) in map {
            if let Some(text) = text.as_str() {
                out.insert(lang.clone(), text.to_string());
            }
        }
    }
    LabelMap(out)
}

fn normalize_tags(raw: Vec<String>, is_start: bool) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = Vec::with_capacity(raw.len());
    for tag in raw {
        if seen.insert(tag.clone()) {
            tags.push(tag);
        }
    }
    if is_start && !seen.contains(START_TAG) {
        tags.push(START_TAG.to_string());
    }
    tags
}

fn normalize_portal(
    value: Option<&Value>,
    node_id: &str,
    warnings: &mut Vec<String>,
) -> Option<PortalTarget> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    let mut drop_with_warning = || {
        warnings.push(format!(
            "node '{node_id}' has an unusable portal config; dropped"
        ));
        None
    };
    let Some(map) = as_object(value) else {
        return drop_with_warning();
    };
    match obj_str(map, "targetType") {
        Some("route") => {
            let target_route_path = obj_non_empty_str(map, "targetRoutePath").map(str::to_string);
            let target_route_id = obj_non_empty_str(map, "targetRouteId").map(str::to_string);
            if target_route_path.is_none() && target_route_id.is_none() {
                return drop_with_warning();
            }
            Some(PortalTarget::Route {
                target_route_path,
                target_route_id,
            })
        }
        Some("node") => match obj_non_empty_str(map, "targetNodeId") {
            Some(target) => Some(PortalTarget::Node {
                target_node_id: target.to_string(),
            }),
            None => drop_with_warning(),
        },
        _ => drop_with_warning(),
    }
}

fn normalize_step_screen(value: Option<&Value>, own_route_path: Option<&str>) -> Option<StepScreen> {
    let map = as_object(value?)?;
    let host_route_path = obj_non_empty_str(map, "hostRoutePath")
        .or(own_route_path)
        .map(str::to_string)?;
    let step_key = obj_non_empty_str(map, "stepKey")?.to_string();
    let query = map
        .get("query")
        .and_then(as_object)
        .map(|q| {
            q.iter()
                .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
                .collect::<IndexMap<String, String>>()
        })
        .unwrap_or_default();
    Some(StepScreen {
        host_route_path,
        step_key,
        label: obj_string(map, "label"),
        query,
    })
}

fn normalize_internal_steps(
    value: Option<&Value>,
    node_id: &str,
    warnings: &mut Vec<String>,
) -> Vec<InternalStep> {
    let Some(value) = value else {
        return Vec::new();
    };
    if value.is_null() {
        return Vec::new();
    }
    let Some(entries) = value.as_array() else {
        warnings.push(format!("node '{node_id}' internalSteps is not a list; ignored"));
        return Vec::new();
    };
    let mut steps = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Some(map) = as_object(entry) else {
            warnings.push(format!(
                "node '{node_id}' internal step at index {index} is malformed; skipped"
            ));
            continue;
        };
        let id = obj_non_empty_str(map, "id")
            .map(str::to_string)
            .unwrap_or_else(|| format!("step_{index}"));
        let label = obj_non_empty_str(map, "label")
            .map(str::to_string)
            .unwrap_or_else(|| id.clone());
        steps.push(InternalStep {
            id,
            label,
            description: obj_string(map, "description"),
            tags: map.get("tags").map(string_list).unwrap_or_default(),
        });
    }
    steps
}

fn normalize_edge(
    raw: &Value,
    index: usize,
    source_label: &str,
    source_path: Option<&Path>,
) -> Result<FlowEdge> {
    let map = as_object(raw).ok_or_else(|| SpecError::EdgeShape {
        index,
        location: loc(source_label, source_path).with_pointer(format!("/edges/{index}")),
    })?;
    let source = obj_non_empty_str(map, "source");
    let target = obj_non_empty_str(map, "target");
    let (source, target) = match (source, target) {
        (Some(source), Some(target)) => (source.to_string(), target.to_string()),
        _ => {
            let edge_ref = obj_non_empty_str(map, "id")
                .map(str::to_string)
                .unwrap_or_else(|| index.to_string());
            return Err(SpecError::EdgeEndpoints {
                edge_ref,
                location: loc(source_label, source_path).with_pointer(format!("/edges/{index}")),
            });
        }
    };
    Ok(FlowEdge {
        id: obj_non_empty_str(map, "id")
            .map(str::to_string)
            .unwrap_or_else(|| format!("edge_{index}")),
        source,
        target,
        label: normalize_label(map.get("label")),
        condition_tag: obj_string(map, "conditionTag"),
        event_name: obj_string(map, "eventName"),
        source_handle: obj_string(map, "sourceHandle"),
        target_handle: obj_string(map, "targetHandle"),
        color: obj_string(map, "color"),
        command: obj_string(map, "command"),
    })
}

fn normalize_chunks(
    value: Option<&Value>,
    provider: &dyn ChunkProvider,
    warnings: &mut Vec<String>,
) -> Vec<FlowChunk> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return provider.normalize(Vec::new());
    };
    let mut sanitized: Vec<FlowChunk> = Vec::with_capacity(entries.len());
    for (index, raw) in entries.iter().enumerate() {
        let Some(map) = as_object(raw) else {
            warnings.push(format!("chunk entry at index {index} is not an object; skipped"));
            continue;
        };
        let Some(id) = obj_non_empty_str(map, "id") else {
            warnings.push(format!("chunk entry at index {index} has no id; skipped"));
            continue;
        };
        let title = obj_non_empty_str(map, "title")
            .map(|t| t.trim().to_string())
            .unwrap_or_else(|| format!("Chunk {}", sanitized.len() + 1));
        sanitized.push(FlowChunk {
            id: id.trim().to_string(),
            title,
            order: obj_f64(map, "order")
                .map(|order| order as i64)
                .unwrap_or(index as i64),
            color: obj_string(map, "color"),
            collapsed_by_default: obj_bool(map, "collapsedByDefault"),
            meta: map.get("meta").and_then(as_object).map(chunk_meta_from_object),
        });
    }
    provider.normalize(sanitized)
}

fn chunk_meta_from_object(map: &Map<String, Value>) -> ChunkMeta {
    let mut meta = ChunkMeta::default();
    for (key, value) in map {
        match key.as_str() {
            "tierMin" => {
                if let Some(tier) = value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                    meta.tier_min = Some(tier);
                    continue;
                }
            }
            "menuState" => {
                if let Ok(state) = serde_json::from_value::<MenuState>(value.clone()) {
                    meta.menu_state = Some(state);
                    continue;
                }
            }
            "routeGroups" => {
                if let Some(groups) = strict_string_list(value) {
                    meta.route_groups = groups;
                    continue;
                }
            }
            "routePrefixes" => {
                if let Some(prefixes) = strict_string_list(value) {
                    meta.route_prefixes = prefixes;
                    continue;
                }
            }
            _ => {}
        }
        // Unrecognized (or wrongly-typed) keys pass through unchanged.
        meta.extra.insert(key.clone(), value.clone());
    }
    meta
}

fn normalize_comments(
    value: Option<&Value>,
    node_ids: &HashSet<String>,
    chunk_ids: &HashSet<String>,
    warnings: &mut Vec<String>,
) -> Vec<FlowComment> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut comments = Vec::with_capacity(entries.len());
    for (index, raw) in entries.iter().enumerate() {
        let Some(map) = as_object(raw) else {
            warnings.push(format!(
                "comment entry at index {index} is not an object; skipped"
            ));
            continue;
        };
        let id = obj_non_empty_str(map, "id")
            .map(str::to_string)
            .unwrap_or_else(|| format!("comment_{index}"));
        let target_type = match obj_str(map, "targetType") {
            Some("node") => Some(CommentTargetKind::Node),
            Some("chunk") => Some(CommentTargetKind::Chunk),
            _ => None,
        };
        let target_id = obj_non_empty_str(map, "targetId");
        let message = obj_non_empty_str(map, "message");
        let (Some(target_type), Some(target_id), Some(message)) = (target_type, target_id, message)
        else {
            warnings.push(format!(
                "comment '{id}' is missing targetType/targetId/message; dropped"
            ));
            continue;
        };
        let resolved_target = match target_type {
            CommentTargetKind::Node => node_ids.contains(target_id),
            CommentTargetKind::Chunk => chunk_ids.contains(target_id),
        };
        if !resolved_target {
            warnings.push(format!(
                "comment '{id}' references unknown target '{target_id}'; dropped"
            ));
            continue;
        }
        comments.push(FlowComment {
            id,
            target_type,
            target_id: target_id.to_string(),
            author: obj_string(map, "author"),
            message: message.to_string(),
            created_at: obj_string(map, "createdAt"),
            resolved: obj_bool(map, "resolved").unwrap_or(false),
        });
    }
    comments
}

fn normalize_overlays(
    value: Option<&Value>,
    node_ids: &HashSet<String>,
    warnings: &mut Vec<String>,
) -> Vec<FlowOverlay> {
    let Some(value) = value else {
        return Vec::new();
    };
    if value.is_null() {
        return Vec::new();
    }
    let Some(entries) = value.as_array() else {
        warnings.push("overlays is not a list; ignored".to_string());
        return Vec::new();
    };
    let mut overlays = Vec::with_capacity(entries.len());
    for (index, raw) in entries.iter().enumerate() {
        let Some(map) = as_object(raw) else {
            warnings.push(format!(
                "overlay entry at index {index} is not an object; skipped"
            ));
            continue;
        };
        let id = obj_non_empty_str(map, "id")
            .map(str::to_string)
            .unwrap_or_else(|| format!("overlay_{index}"));
        let status = match obj_str(map, "status") {
            None => OverlayStatus::Draft,
            Some("draft") => OverlayStatus::Draft,
            Some("active") => OverlayStatus::Active,
            Some(other) => {
                warnings.push(format!(
                    "overlay '{id}' has unknown status '{other}'; treated as draft"
                ));
                OverlayStatus::Draft
            }
        };
        let steps = match obj_array(map, "steps") {
            Some(entries) => normalize_overlay_steps(entries, &id, node_ids, warnings),
            None => {
                warnings.push(format!("overlay '{id}' has no steps array"));
                Vec::new()
            }
        };
        let edges = normalize_overlay_edges(map.get("edges"), &id, warnings);
        overlays.push(FlowOverlay {
            id,
            name: obj_string(map, "name"),
            status,
            entry_route_path: obj_non_empty_str(map, "entryRoutePath").map(str::to_string),
            exit_route_path: obj_non_empty_str(map, "exitRoutePath").map(str::to_string),
            steps,
            edges,
        });
    }
    overlays
}

fn normalize_overlay_steps(
    entries: &[Value],
    overlay_id: &str,
    node_ids: &HashSet<String>,
    warnings: &mut Vec<String>,
) -> Vec<OverlayStep> {
    let mut steps = Vec::with_capacity(entries.len());
    for (index, raw) in entries.iter().enumerate() {
        let Some(map) = as_object(raw) else {
            warnings.push(format!(
                "overlay '{overlay_id}' step at index {index} is malformed; dropped"
            ));
            continue;
        };
        let Some(node_id) = obj_non_empty_str(map, "nodeId") else {
            warnings.push(format!(
                "overlay '{overlay_id}' step at index {index} has no nodeId; dropped"
            ));
            continue;
        };
        // Journeys may be authored before their target nodes exist, so an
        // unknown node keeps the step.
        if !node_ids.contains(node_id) {
            warnings.push(format!(
                "overlay '{overlay_id}' step at index {index} references unknown node '{node_id}'"
            ));
        }
        steps.push(OverlayStep {
            node_id: node_id.to_string(),
            gate_tag: obj_string(map, "gateTag"),
            tags: map.get("tags").map(string_list).unwrap_or_default(),
            url_pattern: obj_string(map, "urlPattern"),
            assert_test_id: obj_string(map, "assertTestId"),
            click_test_id: obj_string(map, "clickTestId"),
        });
    }
    steps
}

fn normalize_overlay_edges(
    value: Option<&Value>,
    overlay_id: &str,
    warnings: &mut Vec<String>,
) -> Vec<OverlayEdge> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut edges = Vec::with_capacity(entries.len());
    for (index, raw) in entries.iter().enumerate() {
        let endpoints = as_object(raw).and_then(|map| {
            let from = obj_non_empty_str(map, "fromNodeId")?;
            let to = obj_non_empty_str(map, "toNodeId")?;
            Some((from.to_string(), to.to_string()))
        });
        match endpoints {
            Some((from_node_id, to_node_id)) => edges.push(OverlayEdge {
                from_node_id,
                to_node_id,
            }),
            None => warnings.push(format!(
                "overlay '{overlay_id}' edge at index {index} is missing endpoints; dropped"
            )),
        }
    }
    edges
}

fn loc(source_label: &str, source_path: Option<&Path>) -> ErrorLocation {
    ErrorLocation::at(source_label).with_source_path(source_path)
}
