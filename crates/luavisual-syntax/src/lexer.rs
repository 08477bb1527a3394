//! Hand-written lexer.
//!
//! The lexer is fail-soft: characters it does not recognize are skipped and
//! unterminated strings or comments simply end at end of input. It never
//! returns an error.

use crate::token::{Token, TokenKind, is_keyword};

/// Multi-character operators, longest first so matching is greedy.
const MULTI_CHAR_OPERATORS: &[&str] = &[
    "...", "==", "~=", "<=", ">=", "..", "+=", "-=", "*=", "/=", "//",
];

const SINGLE_CHAR_OPERATORS: &str = "+-*/%^#<>=.";
const PUNCTUATION: &str = "(){}[],;:";

/// Tokenize `source`, dropping comments. The result always ends with an
/// `Eof` token.
pub fn tokenize(source: &str) -> Vec<Token> {
    tokenize_from_line(source, 1)
}

/// Like [`tokenize`], but numbers lines starting at `first_line`. Used when
/// lexing a slice of a larger document so positions still refer to the
/// original text.
pub fn tokenize_from_line(source: &str, first_line: usize) -> Vec<Token> {
    let mut lexer = Lexer::with_start_line(source, first_line);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_raw();
        match token.kind {
            TokenKind::Comment => continue,
            TokenKind::Eof => {
                tokens.push(token);
                break;
            }
            _ => tokens.push(token),
        }
    }
    tokens
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self::with_start_line(source, 1)
    }

    pub fn with_start_line(source: &str, first_line: usize) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: first_line.max(1),
            column: 1,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek(i) == Some(c))
    }

    fn skip_whitespace(&mut self) {
        while self.peek(0).is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Next token including comments. Returns `Eof` forever once input is
    /// exhausted.
    pub fn next_raw(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            let (line, column) = (self.line, self.column);
            let Some(c) = self.peek(0) else {
                return Token::eof(line, column);
            };

            if c == '-' && self.peek(1) == Some('-') {
                return self.read_comment(line, column);
            }
            if c == '"' || c == '\'' {
                return self.read_string(c, line, column);
            }
            if c.is_ascii_digit() || (c == '.' && self.peek(1).is_some_and(|d| d.is_ascii_digit()))
            {
                return self.read_number(line, column);
            }
            if c.is_ascii_alphabetic() || c == '_' {
                return self.read_word(line, column);
            }
            if let Some(op) = MULTI_CHAR_OPERATORS.iter().find(|op| self.starts_with(op)) {
                for _ in 0..op.len() {
                    self.advance();
                }
                return Token::new(TokenKind::Operator, *op, line, column);
            }
            if SINGLE_CHAR_OPERATORS.contains(c) {
                self.advance();
                return Token::new(TokenKind::Operator, c.to_string(), line, column);
            }
            if PUNCTUATION.contains(c) {
                self.advance();
                return Token::new(TokenKind::Punctuation, c.to_string(), line, column);
            }

            // Unknown character: drop it and keep going.
            self.advance();
        }
    }

    fn read_comment(&mut self, line: usize, column: usize) -> Token {
        self.advance();
        self.advance();
        let mut text = String::new();

        if let Some(level) = self.long_bracket_level() {
            let close = format!("]{}]", "=".repeat(level));
            for _ in 0..level + 2 {
                self.advance();
            }
            while self.peek(0).is_some() && !self.starts_with(&close) {
                if let Some(c) = self.advance() {
                    text.push(c);
                }
            }
            for _ in 0..close.len() {
                self.advance();
            }
        } else {
            while let Some(c) = self.peek(0) {
                if c == '\n' {
                    break;
                }
                text.push(c);
                self.advance();
            }
        }

        Token::new(TokenKind::Comment, text, line, column)
    }

    /// Level of a `[[` / `[==[` opener at the cursor.
    fn long_bracket_level(&self) -> Option<usize> {
        if self.peek(0) != Some('[') {
            return None;
        }
        let level = (1..).take_while(|&i| self.peek(i) == Some('=')).count();
        (self.peek(level + 1) == Some('[')).then_some(level)
    }

    fn read_string(&mut self, quote: char, line: usize, column: usize) -> Token {
        self.advance();
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if c == quote || c == '\n' {
                break;
            }
            if c == '\\' {
                text.push(c);
                self.advance();
                if let Some(escaped) = self.advance() {
                    text.push(escaped);
                }
                continue;
            }
            text.push(c);
            self.advance();
        }
        if self.peek(0) == Some(quote) {
            self.advance();
        }

        let mut token = Token::new(TokenKind::String, text, line, column);
        token.quote = Some(quote);
        token
    }

    fn read_number(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::new();

        if self.peek(0) == Some('0') && matches!(self.peek(1), Some('x' | 'X')) {
            for _ in 0..2 {
                if let Some(c) = self.advance() {
                    text.push(c);
                }
            }
            while let Some(c) = self.peek(0).filter(char::is_ascii_hexdigit) {
                text.push(c);
                self.advance();
            }
            return Token::new(TokenKind::Number, text, line, column);
        }

        self.take_digits(&mut text);
        // `1..2` is a concatenation, not a decimal point.
        if self.peek(0) == Some('.') && self.peek(1) != Some('.') {
            text.push('.');
            self.advance();
            self.take_digits(&mut text);
        }
        if matches!(self.peek(0), Some('e' | 'E')) {
            let signed = matches!(self.peek(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    if let Some(c) = self.advance() {
                        text.push(c);
                    }
                }
                self.take_digits(&mut text);
            }
        }

        Token::new(TokenKind::Number, text, line, column)
    }

    fn take_digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek(0).filter(char::is_ascii_digit) {
            text.push(c);
            self.advance();
        }
    }

    fn read_word(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek(0).filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
            text.push(c);
            self.advance();
        }
        let kind = if is_keyword(&text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, text, line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_text(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = kinds_and_text("local player = nil");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Keyword, "local".into()),
                (TokenKind::Identifier, "player".into()),
                (TokenKind::Operator, "=".into()),
                (TokenKind::Keyword, "nil".into()),
                (TokenKind::Eof, "".into()),
            ]
        );
    }

    #[test]
    fn test_comments_are_dropped() {
        let tokens = kinds_and_text("-- line comment\nx --[[ block\ncomment ]] y");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Identifier, "x".into()),
                (TokenKind::Identifier, "y".into()),
                (TokenKind::Eof, "".into()),
            ]
        );
    }

    #[test]
    fn test_leveled_block_comment() {
        let tokens = kinds_and_text("a --[==[ x ]] end ]=] y ]==] b");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Identifier, "a".into()),
                (TokenKind::Identifier, "b".into()),
                (TokenKind::Eof, "".into()),
            ]
        );

        let mut lexer = Lexer::new("--[=[\nRegisterCommand(]=]");
        let comment = lexer.next_raw();
        assert_eq!(comment.text, "\nRegisterCommand(");
        assert!(lexer.next_raw().is_eof());
    }

    #[test]
    fn test_raw_lexer_keeps_comments() {
        let mut lexer = Lexer::new("-- hi\n");
        let token = lexer.next_raw();
        assert_eq!(token.kind, TokenKind::Comment);
        assert_eq!(token.text, " hi");
        assert!(lexer.next_raw().is_eof());
    }

    #[test]
    fn test_string_escapes_kept_raw() {
        let tokens = tokenize(r#"'it\'s' "say \"hi\"""#);
        assert_eq!(tokens[0].text, r"it\'s");
        assert_eq!(tokens[0].quote, Some('\''));
        assert_eq!(tokens[1].text, r#"say \"hi\""#);
        assert_eq!(tokens[1].quote, Some('"'));
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds_and_text("10 3.25 .5 1e3 0xFF");
        let numbers: Vec<_> = tokens
            .iter()
            .filter(|(k, _)| *k == TokenKind::Number)
            .map(|(_, t)| t.as_str())
            .collect();
        assert_eq!(numbers, vec!["10", "3.25", ".5", "1e3", "0xFF"]);
    }

    #[test]
    fn test_greedy_operators() {
        let tokens = kinds_and_text("a ~= b .. c <= d x += 1 ...");
        let ops: Vec<_> = tokens
            .iter()
            .filter(|(k, _)| *k == TokenKind::Operator)
            .map(|(_, t)| t.as_str())
            .collect();
        assert_eq!(ops, vec!["~=", "..", "<=", "+=", "..."]);
    }

    #[test]
    fn test_concat_after_number() {
        let tokens = kinds_and_text("1..x");
        assert_eq!(tokens[0], (TokenKind::Number, "1".into()));
        assert_eq!(tokens[1], (TokenKind::Operator, "..".into()));
    }

    #[test]
    fn test_unknown_characters_skipped() {
        let tokens = kinds_and_text("a @ $ b");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1], (TokenKind::Identifier, "b".into()));
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("x\n  y");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
    }

    #[test]
    fn test_line_offset() {
        let tokens = tokenize_from_line("a\nb", 10);
        assert_eq!(tokens[0].line, 10);
        assert_eq!(tokens[1].line, 11);
    }

    #[test]
    fn test_empty_input_is_just_eof() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }
}
