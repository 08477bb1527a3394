//! Parse errors.

use crate::token::Token;

/// Error raised by the parser. Every variant can report the source line it
/// refers to, and its message always cites that line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected {found} at line {line}, column {column}")]
    Unexpected {
        found: String,
        line: usize,
        column: usize,
    },

    #[error("expected '{expected}' but found {found} at line {line}, column {column}")]
    Expected {
        expected: String,
        found: String,
        line: usize,
        column: usize,
    },

    #[error("nesting deeper than {limit} levels at line {line}")]
    TooDeep { limit: usize, line: usize },

    #[error("gave up after {steps} recovery attempts; first error: {first}")]
    RecoveryLimit {
        steps: usize,
        first: Box<ParseError>,
    },
}

impl ParseError {
    pub(crate) fn unexpected(token: &Token) -> Self {
        Self::Unexpected {
            found: token.describe(),
            line: token.line,
            column: token.column,
        }
    }

    pub(crate) fn expected(expected: &str, token: &Token) -> Self {
        Self::Expected {
            expected: expected.to_string(),
            found: token.describe(),
            line: token.line,
            column: token.column,
        }
    }

    /// Line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            Self::Unexpected { line, .. }
            | Self::Expected { line, .. }
            | Self::TooDeep { line, .. } => *line,
            Self::RecoveryLimit { first, .. } => first.line(),
        }
    }
}
