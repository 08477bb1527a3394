//! AST to graph conversion.
//!
//! The converter walks statements with a single cursor: the node new
//! statements attach to and the handle they attach with. A leaf statement
//! moves the cursor onto itself, so consecutive statements form a
//! `flow-out` chain. A block statement (function, loop, handler call,
//! conditional) converts its body under itself and then puts the cursor
//! back where it was, which makes the next statement its sibling rather
//! than a descendant of its last body statement.
//!
//! Positions are a layout hint only: `x` grows with block depth and `y`
//! with every node, which is also the order the generator reads siblings
//! back in.

use luavisual_syntax::{Expr, Program, Stmt, StmtKind};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::catalog::{self, CallMatch};
use crate::config::LayoutConfig;
use crate::graph::{CODE_BLOCK, Graph, GraphEdge, GraphNode, LABEL, Position, SourceHandle};
use crate::kind::NodeKind;

/// Convert with the default layout.
pub fn convert(program: &Program) -> Graph {
    Converter::new(&LayoutConfig::default()).convert(program)
}

/// Node and edge ids for one conversion run. Ids embed a random build tag,
/// so two runs over the same program never share ids.
struct IdGen {
    build: String,
    nodes: usize,
    edges: usize,
}

impl IdGen {
    fn new() -> Self {
        let mut build = Uuid::new_v4().simple().to_string();
        build.truncate(8);
        Self {
            build,
            nodes: 0,
            edges: 0,
        }
    }

    fn node(&mut self) -> String {
        self.nodes += 1;
        format!("node-{}-{}", self.nodes, self.build)
    }

    fn edge(&mut self) -> String {
        self.edges += 1;
        format!("edge-{}-{}", self.edges, self.build)
    }
}

#[derive(Debug, Clone)]
struct Cursor {
    parent: Option<String>,
    handle: SourceHandle,
}

impl Cursor {
    fn under(parent: &str, handle: SourceHandle) -> Self {
        Self {
            parent: Some(parent.to_string()),
            handle,
        }
    }
}

pub struct Converter<'c> {
    layout: &'c LayoutConfig,
    ids: IdGen,
    graph: Graph,
    cursor: Cursor,
    row: usize,
    depth: usize,
}

impl<'c> Converter<'c> {
    pub fn new(layout: &'c LayoutConfig) -> Self {
        Self {
            layout,
            ids: IdGen::new(),
            graph: Graph::default(),
            cursor: Cursor {
                parent: None,
                handle: SourceHandle::FlowOut,
            },
            row: 0,
            depth: 0,
        }
    }

    pub fn convert(mut self, program: &Program) -> Graph {
        self.convert_block(&program.body);
        tracing::debug!(
            "converted {} statements into {} nodes, {} edges",
            program.body.len(),
            self.graph.nodes.len(),
            self.graph.edges.len()
        );
        self.graph
    }

    fn convert_block(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.convert_stmt(stmt);
        }
    }

    fn convert_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::LocalDeclaration { name, value } => {
                let value = value
                    .as_ref()
                    .map_or_else(|| "nil".to_string(), ToString::to_string);
                self.variable(name.clone(), value, stmt);
            }

            StmtKind::Assignment { target, value, .. } => {
                self.variable(target.to_string(), value.to_string(), stmt);
            }

            StmtKind::FunctionDeclaration {
                name,
                params,
                body,
                is_local,
                ..
            } => {
                let data = data_with_label(
                    name,
                    [
                        ("functionName", Value::from(name.as_str())),
                        ("parameters", Value::from(params.join(", "))),
                        ("isLocal", Value::from(*is_local)),
                    ],
                );
                self.block(NodeKind::FUNCTION_DEF, data, body);
            }

            StmtKind::IfStatement {
                condition,
                consequent,
                alternate,
            } => self.conditional(condition, consequent, alternate.as_deref()),

            StmtKind::WhileLoop { condition, body } => {
                let data = titled(
                    NodeKind::While,
                    [("condition", Value::from(condition.to_string()))],
                );
                self.block(NodeKind::WHILE, data, body);
            }

            StmtKind::ForLoop {
                variable,
                start,
                end,
                step,
                body,
            } => {
                let mut data = titled(
                    NodeKind::For,
                    [
                        ("loopVar", Value::from(variable.as_str())),
                        ("startVal", Value::from(start.to_string())),
                        ("endVal", Value::from(end.to_string())),
                    ],
                );
                if let Some(step) = step {
                    data.insert("step".into(), Value::from(step.to_string()));
                }
                self.block(NodeKind::FOR, data, body);
            }

            StmtKind::ForInLoop {
                variables,
                iterable,
                body,
            } => {
                let data = titled(
                    NodeKind::ForIn,
                    [
                        ("variables", Value::from(variables.join(", "))),
                        ("iterable", Value::from(iterable.to_string())),
                    ],
                );
                self.block(NodeKind::FOR_IN, data, body);
            }

            StmtKind::ReturnStatement { values } => {
                let values: Vec<String> = values.iter().map(ToString::to_string).collect();
                let data = titled(
                    NodeKind::Return,
                    [("returnValue", Value::from(values.join(", ")))],
                );
                self.leaf(NodeKind::RETURN, data);
            }

            StmtKind::Break => self.custom_code("break", stmt),

            StmtKind::ExpressionStatement { expr } => self.call(expr, stmt),
        }
    }

    fn call(&mut self, expr: &Expr, stmt: &Stmt) {
        let Some((callee, args)) = catalog::split_call(expr) else {
            self.custom_code(NodeKind::CustomCode.title(), stmt);
            return;
        };

        match catalog::match_call(&callee, args) {
            Some(CallMatch {
                entry,
                fields,
                handler_body,
            }) => {
                let mut data = data_with_label(entry.title, []);
                data.extend(fields);
                match handler_body {
                    Some(body) => self.block(entry.kind, data, body),
                    None => self.leaf(entry.kind, data),
                }
            }
            None => self.custom_code(&callee, stmt),
        }
    }

    fn variable(&mut self, name: String, value: String, stmt: &Stmt) {
        let data = titled(
            NodeKind::Variable,
            [
                ("varName", Value::from(name)),
                ("varValue", Value::from(value)),
                (CODE_BLOCK, Value::from(stmt.to_string())),
            ],
        );
        self.leaf(NodeKind::VARIABLE, data);
    }

    /// Verbatim fallback: the statement's full source text.
    fn custom_code(&mut self, label: &str, stmt: &Stmt) {
        let data = data_with_label(label, [(CODE_BLOCK, Value::from(stmt.to_string()))]);
        self.leaf(NodeKind::CUSTOM_CODE, data);
    }

    fn leaf(&mut self, kind: &str, data: Map<String, Value>) {
        let id = self.add_node(kind, data);
        self.cursor = Cursor::under(&id, SourceHandle::FlowOut);
    }

    fn block(&mut self, kind: &str, data: Map<String, Value>, body: &[Stmt]) {
        let entry = self.cursor.clone();
        let id = self.add_node(kind, data);

        self.cursor = Cursor::under(&id, SourceHandle::FlowOut);
        self.depth += 1;
        self.convert_block(body);
        self.depth -= 1;

        self.cursor = entry;
    }

    /// Each branch starts with a `true`/`false` edge from the conditional;
    /// the rest of the branch chains from its first statement.
    fn conditional(&mut self, condition: &Expr, consequent: &[Stmt], alternate: Option<&[Stmt]>) {
        let entry = self.cursor.clone();
        let data = titled(
            NodeKind::If,
            [("condition", Value::from(condition.to_string()))],
        );
        let id = self.add_node(NodeKind::IF, data);

        self.depth += 1;
        self.cursor = Cursor::under(&id, SourceHandle::True);
        self.convert_block(consequent);
        if let Some(alternate) = alternate {
            self.cursor = Cursor::under(&id, SourceHandle::False);
            self.convert_block(alternate);
        }
        self.depth -= 1;

        self.cursor = entry;
    }

    /// Create a node at the next layout slot and link it to the cursor.
    fn add_node(&mut self, kind: &str, data: Map<String, Value>) -> String {
        let id = self.ids.node();
        let position = Position {
            x: self.layout.start_x + self.depth as f64 * self.layout.indent_offset,
            y: self.layout.start_y + self.row as f64 * self.layout.vertical_spacing,
        };
        self.row += 1;

        self.graph.nodes.push(GraphNode {
            id: id.clone(),
            kind: kind.to_string(),
            data,
            position,
        });

        if let Some(parent) = &self.cursor.parent {
            let edge = GraphEdge::new(self.ids.edge(), parent.as_str(), id.as_str(), self.cursor.handle);
            self.graph.edges.push(edge);
        }

        id
    }
}

fn data_with_label<const N: usize>(label: &str, fields: [(&str, Value); N]) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert(LABEL.to_string(), Value::from(label));
    for (key, value) in fields {
        data.insert(key.to_string(), value);
    }
    data
}

fn titled<const N: usize>(kind: NodeKind, fields: [(&str, Value); N]) -> Map<String, Value> {
    data_with_label(kind.title(), fields)
}
