//! Token model shared by the lexer and parser.

use serde::Serialize;

/// Reserved words of the dialect.
pub const KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "if", "in", "local",
    "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// Returns true if `word` is a reserved keyword.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Keyword,
    Identifier,
    String,
    Number,
    Operator,
    Punctuation,
    /// Only produced by [`crate::Lexer::next_raw`]; `tokenize` drops comments.
    Comment,
    Eof,
}

/// A lexed token with its 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw text. For strings this is the content between the quotes with
    /// escapes kept exactly as written.
    pub text: String,
    pub line: usize,
    pub column: usize,
    /// Delimiter of a string token (`'` or `"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<char>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
            quote: None,
        }
    }

    pub fn eof(line: usize, column: usize) -> Self {
        Self::new(TokenKind::Eof, "", line, column)
    }

    /// True for keyword, operator or punctuation tokens spelled `text`.
    pub fn is(&self, text: &str) -> bool {
        matches!(
            self.kind,
            TokenKind::Keyword | TokenKind::Operator | TokenKind::Punctuation
        ) && self.text == text
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Human readable form used in diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::String => {
                let q = self.quote.unwrap_or('"');
                format!("{q}{}{q}", self.text)
            }
            _ => format!("'{}'", self.text),
        }
    }
}
