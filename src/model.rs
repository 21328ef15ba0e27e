use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved chunk id for nodes that belong to no authored grouping.
pub const UNGROUPED_CHUNK_ID: &str = "ungrouped";
/// Reserved tag synthesized onto every node flagged `isStart`.
pub const START_TAG: &str = "start";
/// Tag marking a node as a portal (a pointer to another route/node).
pub const PORTAL_TAG: &str = "type:portal";
/// Conventional display-label prefix for portal nodes.
pub const PORTAL_LABEL_PREFIX: &str = "PORTAL:";

fn default_chunk_id() -> String {
    UNGROUPED_CHUNK_ID.to_string()
}

/// Per-language display labels, in author preference order. The first entry
/// is the display override; consumers fall back to route path, then node id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap(pub IndexMap<String, String>);

impl LabelMap {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, lang: &str) -> Option<&str> {
        self.0.get(lang).map(String::as_str)
    }

    /// First non-empty label in author order.
    pub fn first(&self) -> Option<&str> {
        self.0
            .values()
            .map(String::as_str)
            .find(|text| !text.trim().is_empty())
    }
}

/// Optional flow identity; a brand-new spec has none of it yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    #[default]
    Route,
    StepScreen,
}

impl NodeKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "route" => Some(NodeKind::Route),
            "stepScreen" => Some(NodeKind::StepScreen),
            _ => None,
        }
    }
}

/// Layout position; opaque to validation but mandatory for every node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Where a portal node points. A route target needs at least one of its two
/// identifiers to be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "targetType", rename_all = "camelCase")]
pub enum PortalTarget {
    #[serde(rename_all = "camelCase")]
    Route {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_route_path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_route_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Node { target_node_id: String },
}

impl PortalTarget {
    pub fn is_resolved(&self) -> bool {
        match self {
            PortalTarget::Route {
                target_route_path,
                target_route_id,
            } => target_route_path.is_some() || target_route_id.is_some(),
            PortalTarget::Node { target_node_id } => !target_node_id.is_empty(),
        }
    }
}

/// A sub-screen hosted inside a parent route, identified by
/// `(hostRoutePath, stepKey)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepScreen {
    pub host_route_path: String,
    pub step_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub query: IndexMap<String, String>,
}

/// Lightweight in-node sub-step used for step tracking inside a screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalStep {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,
    /// Effective route path: the host route path for step screens, the
    /// node's own path otherwise. Derived once at normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_path: Option<String>,
    #[serde(default, skip_serializing_if = "LabelMap::is_empty")]
    pub label: LabelMap,
    pub position: Position,
    #[serde(default)]
    pub is_start: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default = "default_chunk_id")]
    pub chunk_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portal: Option<PortalTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_screen: Option<StepScreen>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub internal_steps: Vec<InternalStep>,
}

impl FlowNode {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Display label: author override, else effective route path, else id.
    pub fn display_label(&self) -> &str {
        self.label
            .first()
            .or(self.route_path.as_deref())
            .unwrap_or(&self.id)
    }

    /// Effective route key used for duplicate-route bucketing.
    pub fn route_key(&self) -> Option<&str> {
        self.route_path.as_deref().or(self.route_id.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "LabelMap::is_empty")]
    pub label: LabelMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MenuState {
    Off,
    Minimal,
    Core,
    Expanded,
}

/// Typed core of the chunk metadata bag; unrecognized keys pass through
/// `extra` unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_state: Option<MenuState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub route_groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub route_prefixes: Vec<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ChunkMeta {
    pub fn is_empty(&self) -> bool {
        self.tier_min.is_none()
            && self.menu_state.is_none()
            && self.route_groups.is_empty()
            && self.route_prefixes.is_empty()
            && self.extra.is_empty()
    }
}

/// A named, ordered grouping of nodes (e.g. a product phase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowChunk {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed_by_default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ChunkMeta>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentTargetKind {
    Node,
    Chunk,
}

/// An annotation pinned to a node or chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowComment {
    pub id: String,
    pub target_type: CommentTargetKind,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub resolved: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayStatus {
    #[default]
    Draft,
    Active,
}

/// One step of a guided journey, referencing a graph node plus optional
/// gating and end-to-end test hooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayStep {
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assert_test_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_test_id: Option<String>,
}

/// Journey-specific ordering edge, distinct from the main edge set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayEdge {
    pub from_node_id: String,
    pub to_node_id: String,
}

/// A named journey cutting across the main graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowOverlay {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub status: OverlayStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_route_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_route_path: Option<String>,
    #[serde(default)]
    pub steps: Vec<OverlayStep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<OverlayEdge>,
}

/// The validated root document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSpec {
    #[serde(default)]
    pub flow: FlowIdentity,
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<FlowEdge>,
    #[serde(default)]
    pub chunks: Vec<FlowChunk>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<FlowComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overlays: Vec<FlowOverlay>,
    /// Diagnostics bag from a previous run; opaque, passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<IndexMap<String, Value>>,
}

/// A [`FlowSpec`] plus the non-fatal warnings collected while normalizing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSpec {
    #[serde(flatten)]
    pub spec: FlowSpec,
    pub warnings: Vec<String>,
}
