//! Block balance heuristics over raw source text.
//!
//! Keywords are counted through the lexer, so `end` inside a string or a
//! comment never counts.

use luavisual_syntax::{Lexer, TokenKind};

pub(crate) const OPENERS: &[&str] = &["function", "if", "do", "repeat"];
pub(crate) const CLOSERS: &[&str] = &["end", "until"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Balance {
    pub openers: usize,
    pub closers: usize,
}

impl Balance {
    pub fn of(source: &str) -> Self {
        let mut lexer = Lexer::new(source);
        let mut balance = Self::default();
        loop {
            let token = lexer.next_raw();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Keyword if OPENERS.contains(&token.text.as_str()) => {
                    balance.openers += 1
                }
                TokenKind::Keyword if CLOSERS.contains(&token.text.as_str()) => {
                    balance.closers += 1
                }
                _ => {}
            }
        }
        balance
    }

    pub fn is_balanced(&self) -> bool {
        self.openers == self.closers
    }

    /// Closers needed to balance the text.
    pub fn missing(&self) -> usize {
        self.openers.saturating_sub(self.closers)
    }

    /// Closers without an opener.
    pub fn surplus(&self) -> usize {
        self.closers.saturating_sub(self.openers)
    }

    /// Human readable mismatch, `None` when balanced.
    pub fn describe(&self) -> Option<String> {
        if self.missing() > 0 {
            Some(format!("{} block(s) not closed with 'end'", self.missing()))
        } else if self.surplus() > 0 {
            Some(format!("{} 'end' without an opening block", self.surplus()))
        } else {
            None
        }
    }
}

/// Append an `end` line for every unclosed opener.
pub fn close_unbalanced(source: &str) -> String {
    let missing = Balance::of(source).missing();
    if missing == 0 {
        return source.to_string();
    }
    tracing::warn!("appending {missing} missing 'end' to generated text");
    let mut text = source.trim_end().to_string();
    for _ in 0..missing {
        text.push_str("\nend");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_keywords_only() {
        let balance = Balance::of("print('end') -- end\nif a then\n    x()\nend");
        assert_eq!(balance, Balance { openers: 1, closers: 1 });
        assert!(balance.is_balanced());
    }

    #[test]
    fn test_loops_count_do_once() {
        let balance = Balance::of("while x do\nend\nfor i = 1, 2 do\nend\nrepeat\nuntil done");
        assert_eq!(balance, Balance { openers: 3, closers: 3 });
    }

    #[test]
    fn test_close_unbalanced() {
        assert_eq!(
            close_unbalanced("CreateThread(function()\n    if a then\n        b()"),
            "CreateThread(function()\n    if a then\n        b()\nend\nend"
        );
        assert_eq!(close_unbalanced("x = 1"), "x = 1");
    }

    #[test]
    fn test_describe() {
        assert_eq!(Balance::of("if a then").describe().unwrap(), "1 block(s) not closed with 'end'");
        assert_eq!(Balance::of("end").describe().unwrap(), "1 'end' without an opening block");
        assert_eq!(Balance::of("").describe(), None);
    }
}
