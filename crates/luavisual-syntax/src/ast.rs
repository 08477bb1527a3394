//! Abstract syntax tree for the script dialect.
//!
//! Statements carry the source line they start on. Expressions do not carry
//! positions but are deterministically printable through `Display` (see
//! `display.rs`), which is what the graph side relies on to keep raw text
//! for anything it cannot model structurally.

use serde::Serialize;

/// A whole parsed chunk.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self { body }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// A statement plus its 1-based starting line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stmt {
    pub line: usize,
    pub kind: StmtKind,
}

impl Stmt {
    pub fn new(line: usize, kind: StmtKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StmtKind {
    LocalDeclaration {
        name: String,
        value: Option<Expr>,
    },
    Assignment {
        target: Expr,
        /// `=` or a compound form such as `+=`.
        op: String,
        value: Expr,
    },
    FunctionDeclaration {
        /// Dotted/colon name as written (`M.util:run`).
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
        is_local: bool,
        is_method: bool,
    },
    IfStatement {
        condition: Expr,
        consequent: Vec<Stmt>,
        /// `elseif` chains are represented as a single nested `IfStatement`.
        alternate: Option<Vec<Stmt>>,
    },
    WhileLoop {
        condition: Expr,
        body: Vec<Stmt>,
    },
    ForLoop {
        variable: String,
        start: Expr,
        end: Expr,
        step: Option<Expr>,
        body: Vec<Stmt>,
    },
    ForInLoop {
        variables: Vec<String>,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    ReturnStatement {
        values: Vec<Expr>,
    },
    Break,
    ExpressionStatement {
        expr: Expr,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expr {
    Identifier {
        name: String,
    },
    StringLiteral {
        /// Content with escapes as written.
        value: String,
        quote: char,
    },
    NumberLiteral {
        /// Literal text as written (`0xFF`, `1.5`).
        value: String,
    },
    BooleanLiteral {
        value: bool,
    },
    NilLiteral,
    Vararg,
    BinaryExpression {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryExpression {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    FunctionCall {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    MemberExpression {
        object: Box<Expr>,
        property: String,
    },
    IndexExpression {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    TableConstructor {
        fields: Vec<TableField>,
    },
    AnonymousFunction {
        params: Vec<String>,
        body: Vec<Stmt>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum TableField {
    /// `name = value`
    Named { name: String, value: Expr },
    /// `[key] = value`
    Keyed { key: Expr, value: Expr },
    /// `value`
    Positional { value: Expr },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "or" => Self::Or,
            "and" => Self::And,
            "==" => Self::Eq,
            "~=" => Self::Ne,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Le,
            ">=" => Self::Ge,
            ".." => Self::Concat,
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "//" => Self::FloorDiv,
            "%" => Self::Mod,
            "^" => Self::Pow,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "==",
            Self::Ne => "~=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Concat => "..",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
            Self::Mod => "%",
            Self::Pow => "^",
        }
    }

    /// Binding power, higher binds tighter. Unary operators sit at 7.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::Ne | Self::Lt | Self::Gt | Self::Le | Self::Ge => 3,
            Self::Concat => 4,
            Self::Add | Self::Sub => 5,
            Self::Mul | Self::Div | Self::FloorDiv | Self::Mod => 6,
            Self::Pow => 8,
        }
    }

    pub fn is_right_assoc(self) -> bool {
        matches!(self, Self::Concat | Self::Pow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Len,
}

impl UnaryOp {
    pub const PRECEDENCE: u8 = 7;

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Neg => "-",
            Self::Len => "#",
        }
    }
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier { name: name.into() }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::StringLiteral {
            value: value.into(),
            quote: '\'',
        }
    }

    pub fn number(value: impl Into<String>) -> Self {
        Expr::NumberLiteral {
            value: value.into(),
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::FunctionCall {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn member(object: Expr, property: impl Into<String>) -> Self {
        Expr::MemberExpression {
            object: Box::new(object),
            property: property.into(),
        }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::BinaryExpression {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// String content if this is a string literal.
    pub fn as_str_literal(&self) -> Option<&str> {
        match self {
            Expr::StringLiteral { value, .. } => Some(value),
            _ => None,
        }
    }
}
