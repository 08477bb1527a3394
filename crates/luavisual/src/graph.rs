//! Graph value exchanged with the visual editor.
//!
//! The wire shape is the editor's: nodes carry `type`, `data` and
//! `position`; edges carry `source`/`target` plus handles. `data` is an
//! insertion-ordered JSON object whose first entry is the display `label`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Data key for the verbatim source escape hatch.
pub const CODE_BLOCK: &str = "codeBlock";

/// Data key for the display title.
pub const LABEL: &str = "label";

/// Default `targetHandle` for structural edges.
pub const FLOW_IN: &str = "flow-in";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub position: Position,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            data: Map::new(),
            position: Position::default(),
        }
    }

    /// Builder-style field setter, mostly for tests and hand-built graphs.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    /// A data field rendered as text. Strings are returned as-is, booleans
    /// and numbers in their JSON spelling. Missing and `null` fields are
    /// `None`.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.data.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Like [`GraphNode::text`] but falls back to `default` when the field is
    /// missing, `null`, or blank.
    pub fn text_or(&self, key: &str, default: &str) -> String {
        match self.text(key) {
            Some(s) if !s.trim().is_empty() => s,
            _ => default.to_string(),
        }
    }

    /// The raw `codeBlock`, if present and non-empty.
    pub fn code_block(&self) -> Option<String> {
        self.text(CODE_BLOCK).filter(|s| !s.trim().is_empty())
    }
}

/// Which output of a node an edge leaves from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum SourceHandle {
    #[default]
    FlowOut,
    True,
    False,
}

impl SourceHandle {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceHandle::FlowOut => "flow-out",
            SourceHandle::True => "true",
            SourceHandle::False => "false",
        }
    }
}

impl From<Option<String>> for SourceHandle {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("true") => SourceHandle::True,
            Some("false") => SourceHandle::False,
            _ => SourceHandle::FlowOut,
        }
    }
}

impl From<SourceHandle> for String {
    fn from(value: SourceHandle) -> Self {
        value.as_str().to_string()
    }
}

fn flow_in() -> String {
    FLOW_IN.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    #[serde(alias = "sourceId")]
    pub source: String,
    #[serde(alias = "targetId")]
    pub target: String,
    #[serde(default)]
    pub source_handle: SourceHandle,
    #[serde(default = "flow_in")]
    pub target_handle: String,
}

impl GraphEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        source_handle: SourceHandle,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle,
            target_handle: flow_in(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add an edge with the next sequential id.
    pub fn connect(&mut self, source: &str, target: &str, handle: SourceHandle) {
        let id = format!("edge-{}", self.edges.len() + 1);
        self.edges.push(GraphEdge::new(id, source, target, handle));
    }
}

/// Visual order of siblings: left to right, then top to bottom.
fn by_x_then_y(a: &GraphNode, b: &GraphNode) -> Ordering {
    a.position
        .x
        .total_cmp(&b.position.x)
        .then(a.position.y.total_cmp(&b.position.y))
}

/// Visual order of roots: top to bottom, then left to right.
fn by_y_then_x(a: &GraphNode, b: &GraphNode) -> Ordering {
    a.position
        .y
        .total_cmp(&b.position.y)
        .then(a.position.x.total_cmp(&b.position.x))
}

/// Read-only adjacency index over a [`Graph`].
///
/// Edges whose endpoints do not exist are dropped (and logged) when the view
/// is built, so every edge it hands out resolves.
pub struct GraphView<'g> {
    all: &'g [GraphNode],
    nodes: HashMap<&'g str, &'g GraphNode>,
    outgoing: HashMap<&'g str, Vec<&'g GraphEdge>>,
    targets: HashSet<&'g str>,
}

impl<'g> GraphView<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self::from_parts(&graph.nodes, &graph.edges)
    }

    pub fn from_parts(all: &'g [GraphNode], edges: &'g [GraphEdge]) -> Self {
        let nodes: HashMap<&str, &GraphNode> = all.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut outgoing: HashMap<&str, Vec<&GraphEdge>> = HashMap::new();
        let mut targets = HashSet::new();
        for edge in edges {
            if !nodes.contains_key(edge.source.as_str()) || !nodes.contains_key(edge.target.as_str()) {
                tracing::warn!(
                    "ignoring dangling edge {} ({} -> {})",
                    edge.id,
                    edge.source,
                    edge.target
                );
                continue;
            }
            outgoing.entry(edge.source.as_str()).or_default().push(edge);
            targets.insert(edge.target.as_str());
        }

        Self {
            all,
            nodes,
            outgoing,
            targets,
        }
    }

    pub fn node(&self, id: &str) -> Option<&'g GraphNode> {
        self.nodes.get(id).copied()
    }

    /// Nodes with no incoming edge, top to bottom.
    pub fn roots(&self) -> Vec<&'g GraphNode> {
        let mut roots: Vec<_> = self
            .all
            .iter()
            .filter(|n| !self.targets.contains(n.id.as_str()))
            .collect();
        roots.sort_by(|a, b| by_y_then_x(a, b));
        roots
    }

    /// All nodes in root order, for picking up nodes no root reaches.
    pub fn nodes_in_order(&self) -> Vec<&'g GraphNode> {
        let mut nodes: Vec<_> = self.all.iter().collect();
        nodes.sort_by(|a, b| by_y_then_x(a, b));
        nodes
    }

    /// Outgoing edges of `id` paired with their targets, ordered by target
    /// position (x, then y) and then by edge order. `None` selects every
    /// handle.
    pub fn children(
        &self,
        id: &str,
        handle: Option<SourceHandle>,
    ) -> Vec<(&'g GraphEdge, &'g GraphNode)> {
        let Some(edges) = self.outgoing.get(id) else {
            return Vec::new();
        };
        let mut children: Vec<_> = edges
            .iter()
            .filter(|e| handle.is_none_or(|h| e.source_handle == h))
            .filter_map(|e| self.node(&e.target).map(|n| (*e, n)))
            .collect();
        children.sort_by(|(_, a), (_, b)| by_x_then_y(a, b));
        children
    }

    /// Target nodes only, same order as [`GraphView::children`].
    pub fn child_nodes(&self, id: &str, handle: Option<SourceHandle>) -> Vec<&'g GraphNode> {
        self.children(id, handle).into_iter().map(|(_, n)| n).collect()
    }
}
