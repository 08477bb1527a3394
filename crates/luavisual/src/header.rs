//! Header/body split.
//!
//! Scripts usually start with setup the graph does not model (framework
//! objects, config tables, helper functions). Everything above the first
//! root-level registration is kept as an opaque header and carried next to
//! the graph.

use luavisual_syntax::{Token, TokenKind, tokenize};

use crate::balance::{CLOSERS, OPENERS};
use crate::catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceParts<'a> {
    pub header: &'a str,
    pub body: &'a str,
    /// 1-based line of `text` the body starts on.
    pub body_line: usize,
}

/// Split `text` before its first root line. Text without a root line is all
/// body.
pub fn split_source(text: &str) -> SourceParts<'_> {
    let Some(line) = first_root_line(text) else {
        return SourceParts {
            header: "",
            body: text,
            body_line: 1,
        };
    };
    let offset: usize = text
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    SourceParts {
        header: &text[..offset],
        body: &text[offset..],
        body_line: line,
    }
}

/// The header as persisted: surrounding whitespace trimmed.
pub fn extract_header(text: &str) -> String {
    split_source(text).header.trim().to_string()
}

/// First line that starts outside every block and bracket and calls a root
/// callee there. Comments and strings are already tokens, so nothing inside
/// them counts.
fn first_root_line(text: &str) -> Option<usize> {
    let tokens = tokenize(text);
    let callees: Vec<Vec<Token>> = catalog::root_callees().map(callee_tokens).collect();

    let mut depth = 0usize;
    let mut line = 0;
    let mut line_depth = 0;
    for (at, token) in tokens.iter().enumerate() {
        if token.line != line {
            line = token.line;
            line_depth = depth;
        }
        if depth == 0 && line_depth == 0 && callees.iter().any(|c| calls_at(&tokens, at, c)) {
            return Some(token.line);
        }
        depth = nest(depth, token);
    }
    None
}

fn callee_tokens(callee: &str) -> Vec<Token> {
    let mut tokens = tokenize(callee);
    tokens.retain(|t| !t.is_eof());
    tokens
}

/// Does a call to `callee` start at `tokens[at]`? The callee must not be the
/// tail of a longer access path.
fn calls_at(tokens: &[Token], at: usize, callee: &[Token]) -> bool {
    let after = at + callee.len();
    let accessed = at
        .checked_sub(1)
        .and_then(|prev| tokens.get(prev))
        .is_some_and(|t| t.is(".") || t.is(":"));
    let spelled = tokens.get(at..after).is_some_and(|window| {
        window
            .iter()
            .zip(callee)
            .all(|(a, b)| a.kind == b.kind && a.text == b.text)
    });
    !accessed && spelled && tokens.get(after).is_some_and(|t| t.is("("))
}

fn nest(depth: usize, token: &Token) -> usize {
    let text = token.text.as_str();
    match token.kind {
        TokenKind::Keyword if OPENERS.contains(&text) => depth + 1,
        TokenKind::Keyword if CLOSERS.contains(&text) => depth.saturating_sub(1),
        TokenKind::Punctuation if matches!(text, "(" | "{" | "[") => depth + 1,
        TokenKind::Punctuation if matches!(text, ")" | "}" | "]") => depth.saturating_sub(1),
        _ => depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_at_first_registration() {
        let text = "local QBCore = exports['qb-core']:GetCoreObject()\n\nRegisterCommand('a', function()\nend)\n";
        let parts = split_source(text);
        assert_eq!(parts.header, "local QBCore = exports['qb-core']:GetCoreObject()\n\n");
        assert!(parts.body.starts_with("RegisterCommand('a'"));
        assert_eq!(parts.body_line, 3);
        assert_eq!(extract_header(text), "local QBCore = exports['qb-core']:GetCoreObject()");
    }

    #[test]
    fn test_no_root_line_is_all_body() {
        let parts = split_source("local x = 1\nprint(x)");
        assert_eq!(parts.header, "");
        assert_eq!(parts.body, "local x = 1\nprint(x)");
        assert_eq!(parts.body_line, 1);
    }

    #[test]
    fn test_comments_are_not_root_lines() {
        let text = "-- RegisterCommand('old', ...)\n--[[\nCreateThread(function()\n]]\nlocal x = 1 -- CreateThread(f)\nCitizen.CreateThread(function()\nend)";
        let parts = split_source(text);
        assert_eq!(parts.body_line, 6);
        assert!(parts.body.starts_with("Citizen.CreateThread"));
    }

    #[test]
    fn test_callee_must_stand_alone() {
        let body_line = |text: &str| split_source(text).body_line;
        let text = "MyRegisterCommand('x')\nlib.CreateThread(function() end)\nlocal name = 'RegisterCommand'\n    AddEventHandler ('x', handler)";
        assert_eq!(body_line(text), 4);
        assert_eq!(
            body_line("local a = 1\nQBCore.Commands.Add('heal', 'Heal', {}, false, function(source, args)\nend)"),
            2
        );
        assert_eq!(body_line("local a = 1\nexports['qb-core']:DrawText('x')"), 1);
    }

    #[test]
    fn test_helper_function_stays_in_header() {
        let text = "local QBCore = exports['qb-core']:GetCoreObject()\n\nlocal function setup()\n    RegisterNetEvent('bank:open')\nend\n\nRegisterCommand('heal', function(source, args)\nend)\n";
        let parts = split_source(text);
        assert_eq!(parts.body_line, 7);
        assert!(parts.header.ends_with("    RegisterNetEvent('bank:open')\nend\n\n"));
        assert!(parts.body.starts_with("RegisterCommand('heal'"));
    }

    #[test]
    fn test_nested_root_call_is_not_a_boundary() {
        let text = "if IsDuplicityVersion() then\n    RegisterNetEvent('a')\nend\nCreateThread(function()\nend)";
        assert_eq!(split_source(text).body_line, 4);

        let text = "Config = {\n    onLoad = RegisterNetEvent('x'),\n}\nCreateThread(function()\nend)";
        assert_eq!(split_source(text).body_line, 4);

        let only_nested = "local function boot()\n    CreateThread(function()\n    end)\nend";
        let parts = split_source(only_nested);
        assert_eq!(parts.header, "");
        assert_eq!(parts.body, only_nested);
    }

    #[test]
    fn test_leveled_and_trailing_block_comments() {
        let text = "--[==[\nRegisterCommand('old', function() end)\n]==]\nlocal x = 1 --[[ CreateThread(f)\nCreateThread(g) ]]\nAddEventHandler('a', function()\nend)";
        let parts = split_source(text);
        assert_eq!(parts.body_line, 6);
        assert!(parts.body.starts_with("AddEventHandler"));
    }
}
