//! Lexer, parser and printer for the FiveM flavoured Lua dialect.
//!
//! `luavisual-syntax` is the text half of the luavisual translator. It turns
//! source into a position-annotated AST and prints AST fragments back to
//! deterministic source text.
//!
//! # Architecture
//!
//! ```text
//! source ──> tokenize ──> Vec<Token> ──> parse ──> Program
//!                                                     │
//!                              Display / Printer <────┘
//! ```
//!
//! # Example
//!
//! ```
//! use luavisual_syntax::{parse, tokenize};
//!
//! let program = parse(&tokenize("local x = 1 + 2")).unwrap();
//! assert_eq!(program.to_string(), "local x = 1 + 2");
//! ```
//!
//! # Dialect
//!
//! A practical subset of Lua 5.x: locals, assignments (including the
//! compound `+=` family FiveM scripts use), function declarations,
//! conditionals, `while`/`for` loops, returns, calls, method calls, member
//! and index access, tables and anonymous functions. Comments are dropped.
//! Multiple assignment, `goto`, and long strings are not supported.

pub mod ast;
pub mod display;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{BinaryOp, Expr, Program, Stmt, StmtKind, TableField, UnaryOp};
pub use display::{DEFAULT_INDENT, Printer};
pub use error::ParseError;
pub use lexer::{Lexer, tokenize, tokenize_from_line};
pub use parser::{Recovered, parse, parse_recovering};
pub use token::{KEYWORDS, Token, TokenKind, is_keyword};
