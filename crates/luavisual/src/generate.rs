//! Graph to text generation.
//!
//! Every root (a node nothing points at) becomes one block of output, in
//! top-to-bottom order. Within a block the walk is depth first: a node is
//! written, then its children in left-to-right order. Leaf statements pass
//! their children through at the same indentation (that is how a chain of
//! statements is stored); block statements indent theirs and close
//! themselves.
//!
//! Nesting is tracked on the emitter's block stack, so every construct the
//! generator opens is closed structurally. The balance pass afterwards only
//! matters for raw `codeBlock` text that opens blocks on its own.

use std::collections::HashSet;

use crate::balance;
use crate::catalog::{self, CallText};
use crate::config::GeneratorConfig;
use crate::graph::{Graph, GraphEdge, GraphNode, GraphView, SourceHandle};
use crate::kind::NodeKind;

/// A problem the generator worked around. These never abort generation; each
/// one leaves a `-- luavisual:` comment in the output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("block nesting deeper than {limit} levels at node {node}, subtree omitted")]
    DepthExceeded { node: String, limit: usize },

    #[error("node {node} is not reachable from any root")]
    Unreachable { node: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub text: String,
    pub warnings: Vec<GenerateError>,
}

/// Generate with the default configuration.
pub fn generate(nodes: &[GraphNode], edges: &[GraphEdge], header: &str) -> String {
    Generator::new(&GeneratorConfig::default())
        .render(nodes, edges, header)
        .text
}

/// Output lines plus the closers of the blocks currently open.
struct Emitter<'u> {
    lines: Vec<String>,
    closers: Vec<String>,
    unit: &'u str,
}

impl<'u> Emitter<'u> {
    fn new(unit: &'u str) -> Self {
        Self {
            lines: Vec::new(),
            closers: Vec::new(),
            unit,
        }
    }

    /// Write `text` at the current indentation, line by line.
    fn write(&mut self, text: &str) {
        let indent = self.unit.repeat(self.closers.len());
        for line in text.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                self.lines.push(String::new());
            } else {
                self.lines.push(format!("{indent}{line}"));
            }
        }
    }

    fn comment(&mut self, error: &GenerateError) {
        self.write(&format!("-- luavisual: {error}"));
    }

    fn open(&mut self, opener: &str, closer: impl Into<String>) {
        self.write(opener);
        self.closers.push(closer.into());
    }

    fn close(&mut self) {
        if let Some(closer) = self.closers.pop() {
            self.write(&closer);
        }
    }

    /// Write `text` one level out, inside the innermost open block
    /// (`else`, `elseif`).
    fn reopen(&mut self, text: &str) {
        match self.closers.pop() {
            Some(closer) => {
                self.write(text);
                self.closers.push(closer);
            }
            None => self.write(text),
        }
    }

    fn finish(mut self) -> String {
        while !self.closers.is_empty() {
            self.close();
        }
        self.lines.join("\n")
    }
}

/// Traversal state of one generation call.
struct Walk<'g> {
    visited: HashSet<&'g str>,
    warnings: Vec<GenerateError>,
}

impl<'g> Walk<'g> {
    fn warn(&mut self, error: GenerateError, out: &mut Emitter<'_>) {
        tracing::warn!("{error}");
        out.comment(&error);
        self.warnings.push(error);
    }
}

/// How a node is written.
enum Emission {
    /// One statement; children continue at the same level.
    Line(String),
    /// Ends its block; children are dropped.
    Terminal(String),
    Block { opener: String, closer: String },
    Conditional,
    /// Nothing to write; children continue at the same level.
    Skip,
}

pub struct Generator<'c> {
    config: &'c GeneratorConfig,
}

impl<'c> Generator<'c> {
    pub fn new(config: &'c GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn generate(&self, graph: &Graph, header: &str) -> String {
        self.render(&graph.nodes, &graph.edges, header).text
    }

    /// Generate text and report what had to be worked around.
    pub fn render(&self, nodes: &[GraphNode], edges: &[GraphEdge], header: &str) -> Generated {
        let view = GraphView::from_parts(nodes, edges);
        let mut walk = Walk {
            visited: HashSet::new(),
            warnings: Vec::new(),
        };
        let mut blocks = Vec::new();

        for root in view.roots() {
            if walk.visited.contains(root.id.as_str()) {
                continue;
            }
            let mut out = Emitter::new(&self.config.indent);
            self.emit_sequence(&view, vec![root], 0, &mut out, &mut walk);
            blocks.push(out.finish());
        }

        // Whatever is left hangs off a cycle.
        for node in view.nodes_in_order() {
            if walk.visited.contains(node.id.as_str()) {
                continue;
            }
            let mut out = Emitter::new(&self.config.indent);
            walk.warn(
                GenerateError::Unreachable {
                    node: node.id.clone(),
                },
                &mut out,
            );
            self.emit_sequence(&view, vec![node], 0, &mut out, &mut walk);
            blocks.push(out.finish());
        }

        let header = match &self.config.default_header {
            Some(default) if header.trim().is_empty() => default.as_str(),
            _ => header,
        };

        let mut text = String::new();
        if !header.trim().is_empty() {
            text.push_str(header.trim_end());
            text.push_str("\n\n");
        }
        for block in blocks.iter().filter(|b| !b.trim().is_empty()) {
            text.push_str(block);
            text.push_str("\n\n");
        }
        let mut text = text.trim_end().to_string();
        if self.config.balance_closers {
            text = balance::close_unbalanced(&text);
        }

        tracing::debug!(
            "generated {} lines from {} nodes ({} warnings)",
            text.lines().count(),
            nodes.len(),
            walk.warnings.len()
        );
        Generated {
            text,
            warnings: walk.warnings,
        }
    }

    /// Emit `start` and everything chained from it. Siblings are walked with
    /// an explicit stack; only entering a block recurses.
    fn emit_sequence<'g>(
        &self,
        view: &GraphView<'g>,
        start: Vec<&'g GraphNode>,
        depth: usize,
        out: &mut Emitter<'_>,
        walk: &mut Walk<'g>,
    ) {
        let mut pending: Vec<&'g GraphNode> = start.into_iter().rev().collect();
        while let Some(node) = pending.pop() {
            if !walk.visited.insert(node.id.as_str()) {
                continue;
            }
            let followers = self.emit_node(view, node, depth, out, walk);
            pending.extend(followers.into_iter().rev());
        }
    }

    /// Write one node and return the nodes that follow it at the same level.
    fn emit_node<'g>(
        &self,
        view: &GraphView<'g>,
        node: &'g GraphNode,
        depth: usize,
        out: &mut Emitter<'_>,
        walk: &mut Walk<'g>,
    ) -> Vec<&'g GraphNode> {
        let children = view.child_nodes(&node.id, None);

        match emission(node) {
            Emission::Line(text) => {
                out.write(&text);
                children
            }
            Emission::Skip => children,
            Emission::Terminal(text) => {
                out.write(&text);
                if !children.is_empty() {
                    tracing::warn!(
                        "dropping {} node(s) after return node {}",
                        children.len(),
                        node.id
                    );
                    skip_subtree(view, children, walk);
                }
                Vec::new()
            }
            Emission::Block { opener, closer } => {
                if self.too_deep(view, node, depth, out, walk) {
                    return Vec::new();
                }
                out.open(&opener, closer);
                self.emit_sequence(view, children, depth + 1, out, walk);
                out.close();
                Vec::new()
            }
            Emission::Conditional => {
                if self.too_deep(view, node, depth, out, walk) {
                    return Vec::new();
                }
                self.emit_conditional(view, node, depth, out, walk)
            }
        }
    }

    fn too_deep<'g>(
        &self,
        view: &GraphView<'g>,
        node: &'g GraphNode,
        depth: usize,
        out: &mut Emitter<'_>,
        walk: &mut Walk<'g>,
    ) -> bool {
        if depth < self.config.max_depth {
            return false;
        }
        walk.warn(
            GenerateError::DepthExceeded {
                node: node.id.clone(),
                limit: self.config.max_depth,
            },
            out,
        );
        skip_subtree(view, view.child_nodes(&node.id, None), walk);
        true
    }

    /// `if`/`elseif`/`else`. Returns the flow-out children that follow the
    /// whole construct.
    fn emit_conditional<'g>(
        &self,
        view: &GraphView<'g>,
        node: &'g GraphNode,
        depth: usize,
        out: &mut Emitter<'_>,
        walk: &mut Walk<'g>,
    ) -> Vec<&'g GraphNode> {
        let (body, after) = branch_body(view, node);
        out.open(&format!("if {} then", condition(node)), "end");
        self.emit_sequence(view, body, depth + 1, out, walk);

        let mut current = node;
        loop {
            let alternate = view.child_nodes(&current.id, Some(SourceHandle::False));
            if alternate.is_empty() {
                break;
            }
            if let [nested] = alternate[..]
                && self.collapses_to_elseif(view, nested, walk)
            {
                walk.visited.insert(nested.id.as_str());
                out.reopen(&format!("elseif {} then", condition(nested)));
                let (body, _) = branch_body(view, nested);
                self.emit_sequence(view, body, depth + 1, out, walk);
                current = nested;
                continue;
            }
            out.reopen("else");
            self.emit_sequence(view, alternate, depth + 1, out, walk);
            break;
        }

        out.close();
        after
    }

    fn collapses_to_elseif(&self, view: &GraphView<'_>, node: &GraphNode, walk: &Walk<'_>) -> bool {
        node.kind == NodeKind::IF
            && node.code_block().is_none()
            && !walk.visited.contains(node.id.as_str())
            && view.child_nodes(&node.id, Some(SourceHandle::FlowOut)).is_empty()
    }
}

/// The `then` body and what follows `end`. Editor graphs that never tagged
/// the true branch keep the body on `flow-out`.
fn branch_body<'g>(view: &GraphView<'g>, node: &GraphNode) -> (Vec<&'g GraphNode>, Vec<&'g GraphNode>) {
    let consequent = view.child_nodes(&node.id, Some(SourceHandle::True));
    let flow = view.child_nodes(&node.id, Some(SourceHandle::FlowOut));
    if consequent.is_empty() {
        (flow, Vec::new())
    } else {
        (consequent, flow)
    }
}

fn condition(node: &GraphNode) -> String {
    node.text_or("condition", "true")
}

/// Mark everything under `start` as handled without writing it.
fn skip_subtree<'g>(view: &GraphView<'g>, start: Vec<&'g GraphNode>, walk: &mut Walk<'g>) {
    let mut pending = start;
    while let Some(node) = pending.pop() {
        if walk.visited.insert(node.id.as_str()) {
            pending.extend(view.child_nodes(&node.id, None));
        }
    }
}

fn emission(node: &GraphNode) -> Emission {
    if let Some(code) = node.code_block() {
        return Emission::Line(code);
    }

    let Some(kind) = NodeKind::from_tag(&node.kind) else {
        tracing::warn!("no emitter for node kind '{}' ({}), skipping", node.kind, node.id);
        return Emission::Skip;
    };

    match kind {
        NodeKind::FunctionDef => {
            let local = if flag(node, "isLocal") { "local " } else { "" };
            Emission::Block {
                opener: format!(
                    "{local}function {}({})",
                    node.text_or("functionName", "myFunction"),
                    node.text("parameters").unwrap_or_default().trim()
                ),
                closer: "end".into(),
            }
        }
        NodeKind::If => Emission::Conditional,
        NodeKind::While => Emission::Block {
            opener: format!("while {} do", node.text_or("condition", "true")),
            closer: "end".into(),
        },
        NodeKind::For => {
            let step = node
                .text("step")
                .filter(|s| !s.trim().is_empty())
                .map(|s| format!(", {s}"))
                .unwrap_or_default();
            Emission::Block {
                opener: format!(
                    "for {} = {}, {}{step} do",
                    node.text_or("loopVar", "i"),
                    node.text_or("startVal", "1"),
                    node.text_or("endVal", "10"),
                ),
                closer: "end".into(),
            }
        }
        NodeKind::ForIn => Emission::Block {
            opener: format!(
                "for {} in {} do",
                node.text_or("variables", "_, value"),
                node.text_or("iterable", "pairs({})"),
            ),
            closer: "end".into(),
        },
        NodeKind::Return => Emission::Terminal(match node.text("returnValue") {
            Some(value) if !value.trim().is_empty() => format!("return {value}"),
            _ => "return".into(),
        }),
        NodeKind::Variable => Emission::Line(format!(
            "local {} = {}",
            node.text_or("varName", "myVar"),
            node.text_or("varValue", "nil"),
        )),
        NodeKind::CustomCode => Emission::Skip,
        NodeKind::Call(first) => {
            let entry = catalog::entry_for_node(node).unwrap_or(first);
            match catalog::emit_call(entry, node) {
                CallText::Line(line) => Emission::Line(line),
                CallText::Block { opener, closer } => Emission::Block { opener, closer },
            }
        }
    }
}

/// Boolean data field; the editor sometimes stores these as strings.
fn flag(node: &GraphNode, key: &str) -> bool {
    node.text(key).as_deref() == Some("true")
}
