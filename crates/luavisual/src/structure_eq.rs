//! Structural equality for graphs.
//!
//! Two conversions of the same program produce different ids, so graphs are
//! compared by shape instead.
//!
//! # Ignored
//!
//! - Node and edge ids
//! - Node positions (they only decide traversal order)
//! - `targetHandle`
//!
//! # Compared
//!
//! - Node and edge counts
//! - Kind, data, and incoming handle of every node, in traversal order

use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::graph::{Graph, GraphNode, GraphView, SourceHandle};

/// Trait for structural equality comparison.
///
/// Unlike `PartialEq`, this ignores identity and layout.
pub trait StructureEq {
    fn structure_eq(&self, other: &Self) -> bool;
}

/// One node as seen by the traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureStep<'g> {
    pub kind: &'g str,
    pub data: &'g Map<String, Value>,
    /// Handle of the edge the node was reached through; `None` for roots.
    pub handle: Option<SourceHandle>,
}

impl Graph {
    /// Nodes in deterministic depth-first order: roots top to bottom, each
    /// node's children left to right. Nodes only reachable through a cycle
    /// come last.
    pub fn kind_sequence(&self) -> Vec<StructureStep<'_>> {
        let view = GraphView::new(self);
        let mut seen: HashSet<&str> = HashSet::new();
        let mut steps = Vec::with_capacity(self.nodes.len());

        let starts = view.roots().into_iter().chain(view.nodes_in_order());
        for start in starts {
            let mut pending: Vec<(&GraphNode, Option<SourceHandle>)> = vec![(start, None)];
            while let Some((node, handle)) = pending.pop() {
                if !seen.insert(node.id.as_str()) {
                    continue;
                }
                steps.push(StructureStep {
                    kind: &node.kind,
                    data: &node.data,
                    handle,
                });
                let children = view.children(&node.id, None);
                pending.extend(
                    children
                        .into_iter()
                        .rev()
                        .map(|(edge, child)| (child, Some(edge.source_handle))),
                );
            }
        }
        steps
    }
}

impl StructureEq for Graph {
    fn structure_eq(&self, other: &Self) -> bool {
        self.nodes.len() == other.nodes.len()
            && self.edges.len() == other.edges.len()
            && self.kind_sequence() == other.kind_sequence()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(prefix: &str, x: f64) -> Graph {
        let id = |n: &str| format!("{prefix}-{n}");
        let mut graph = Graph::new(
            vec![
                GraphNode::new(id("if"), "logic-if").with("condition", "a").at(x, 0.0),
                GraphNode::new(id("yes"), "wait").with("duration", "1").at(x + 100.0, 100.0),
                GraphNode::new(id("no"), "wait").with("duration", "2").at(x + 100.0, 200.0),
            ],
            Vec::new(),
        );
        graph.connect(&id("if"), &id("yes"), SourceHandle::True);
        graph.connect(&id("if"), &id("no"), SourceHandle::False);
        graph
    }

    #[test]
    fn test_ids_and_positions_ignored() {
        assert!(sample("a", 0.0).structure_eq(&sample("b", 50.0)));
    }

    #[test]
    fn test_handles_compared() {
        let mut other = sample("b", 0.0);
        other.edges[1].source_handle = SourceHandle::True;
        assert!(!sample("a", 0.0).structure_eq(&other));
    }

    #[test]
    fn test_data_compared() {
        let mut other = sample("b", 0.0);
        other.nodes[2].data.insert("duration".into(), "3".into());
        assert!(!sample("a", 0.0).structure_eq(&other));
    }

    #[test]
    fn test_sequence_order() {
        let graph = sample("a", 0.0);
        let steps = graph.kind_sequence();
        let handles: Vec<_> = steps.iter().map(|s| s.handle).collect();
        assert_eq!(
            handles,
            vec![None, Some(SourceHandle::True), Some(SourceHandle::False)]
        );
    }
}
