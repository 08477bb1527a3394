//! Node kinds.

use crate::catalog::{self, CatalogEntry};

/// Closed dispatch over the `type` tag of a graph node.
///
/// Structural kinds come from statements; call kinds come from the catalog.
/// Tags outside both sets (palette-only widgets) do not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    FunctionDef,
    If,
    While,
    For,
    ForIn,
    Return,
    Variable,
    CustomCode,
    Call(&'static CatalogEntry),
}

impl NodeKind {
    pub const FUNCTION_DEF: &'static str = "function-def";
    pub const IF: &'static str = "logic-if";
    pub const WHILE: &'static str = "logic-loop";
    pub const FOR: &'static str = "logic-for";
    pub const FOR_IN: &'static str = "logic-for-in";
    pub const RETURN: &'static str = "logic-return";
    pub const VARIABLE: &'static str = "variable";
    pub const CUSTOM_CODE: &'static str = "custom-code";

    /// Resolve a tag. Catalog kinds resolve to their first entry; use
    /// [`catalog::entry_for_node`] when the node's data matters.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            Self::FUNCTION_DEF => Self::FunctionDef,
            Self::IF => Self::If,
            Self::WHILE => Self::While,
            Self::FOR => Self::For,
            Self::FOR_IN => Self::ForIn,
            Self::RETURN => Self::Return,
            Self::VARIABLE => Self::Variable,
            Self::CUSTOM_CODE => Self::CustomCode,
            _ => return catalog::entries_for_kind(tag).next().map(Self::Call),
        })
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::FunctionDef => Self::FUNCTION_DEF,
            Self::If => Self::IF,
            Self::While => Self::WHILE,
            Self::For => Self::FOR,
            Self::ForIn => Self::FOR_IN,
            Self::Return => Self::RETURN,
            Self::Variable => Self::VARIABLE,
            Self::CustomCode => Self::CUSTOM_CODE,
            Self::Call(entry) => entry.kind,
        }
    }

    /// Display title, the default `label` of new nodes.
    pub fn title(self) -> &'static str {
        match self {
            Self::FunctionDef => "Function",
            Self::If => "If",
            Self::While => "While Loop",
            Self::For => "For Loop",
            Self::ForIn => "For Each",
            Self::Return => "Return",
            Self::Variable => "Variable",
            Self::CustomCode => "Code",
            Self::Call(entry) => entry.title,
        }
    }
}
