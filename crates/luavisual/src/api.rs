//! Entry points used by the editor and the CLI.

use luavisual_syntax::{ParseError, parse, parse_recovering, tokenize, tokenize_from_line};
use serde::{Deserialize, Serialize};

use crate::balance::Balance;
use crate::config::Config;
use crate::convert::Converter;
use crate::generate::Generator;
use crate::graph::{Graph, GraphEdge, GraphNode};
use crate::header::split_source;

/// Result of converting a source file for the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextToGraph {
    pub header: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Set when the body failed to parse. `nodes` and `edges` are then empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Statements dropped by a recovering parse.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl TextToGraph {
    pub fn graph(&self) -> Graph {
        Graph::new(self.nodes.clone(), self.edges.clone())
    }
}

/// Split off the header, parse the body and convert it.
pub fn text_to_graph(source: &str, config: &Config) -> TextToGraph {
    let parts = split_source(source);
    let header = parts.header.trim().to_string();
    let tokens = tokenize_from_line(parts.body, parts.body_line);
    tracing::debug!("lexed {} tokens from line {}", tokens.len(), parts.body_line);

    let mut warnings = Vec::new();
    let parsed = if config.parser.recover {
        parse_recovering(&tokens, config.parser.max_recovery_steps).map(|recovered| {
            for error in &recovered.errors {
                tracing::warn!("skipped malformed statement: {error}");
                warnings.push(error.to_string());
            }
            recovered.program
        })
    } else {
        parse(&tokens)
    };

    match parsed {
        Ok(program) => {
            let graph = Converter::new(&config.layout).convert(&program);
            TextToGraph {
                header,
                nodes: graph.nodes,
                edges: graph.edges,
                error: None,
                warnings,
            }
        }
        Err(error) => TextToGraph {
            header,
            error: Some(error.to_string()),
            warnings,
            ..TextToGraph::default()
        },
    }
}

/// Parse and convert `text` as a whole, without a header split.
pub fn convert_text(text: &str) -> Result<Graph, ParseError> {
    let program = parse(&tokenize(text))?;
    Ok(crate::convert::convert(&program))
}

/// Generate source for a graph. Never fails.
pub fn graph_to_text(graph: &Graph, header: &str, config: &Config) -> String {
    Generator::new(&config.generator).generate(graph, header)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Strict parse plus block balance.
pub fn validate_syntax(text: &str) -> Validation {
    let mut errors = Vec::new();
    if let Err(error) = parse(&tokenize(text)) {
        errors.push(error.to_string());
    }
    if let Some(mismatch) = Balance::of(text).describe() {
        errors.push(mismatch);
    }
    Validation {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure_eq::StructureEq;

    const SCRIPT: &str = "local QBCore = exports['qb-core']:GetCoreObject()\n\nRegisterCommand('heal', function(source, args)\n    QBCore.Functions.Notify('Healed', 'success')\nend)\n";

    #[test]
    fn test_text_to_graph_splits_header() {
        let result = text_to_graph(SCRIPT, &Config::default());
        assert_eq!(result.header, "local QBCore = exports['qb-core']:GetCoreObject()");
        assert_eq!(result.error, None);
        let kinds: Vec<_> = result.nodes.iter().map(|n| n.kind.as_str()).collect();
        assert_eq!(kinds, vec!["event-start", "qb-notify"]);
    }

    #[test]
    fn test_full_round_trip() {
        let config = Config::default();
        let result = text_to_graph(SCRIPT, &config);
        let text = graph_to_text(&result.graph(), &result.header, &config);
        assert_eq!(text, SCRIPT.trim_end());
    }

    #[test]
    fn test_error_cites_source_line() {
        let source = "local QBCore = nil\n\nRegisterCommand('x', function()\n    local = 5\nend)";
        let result = text_to_graph(source, &Config::default());
        let error = result.error.unwrap();
        assert!(error.contains("line 4"), "{error}");
        assert!(result.nodes.is_empty());
        assert_eq!(result.header, "local QBCore = nil");
    }

    #[test]
    fn test_recovering_parse_reports_warnings() {
        let mut config = Config::default();
        config.parser.recover = true;
        let result = text_to_graph("local a = 1\nlocal b = = 2\nlocal c = 3", &config);
        assert_eq!(result.error, None);
        assert_eq!(result.nodes.len(), 2);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_convert_text_is_idempotent() {
        let source = "if x > 5 then\n    print('yes')\nelse\n    print('no')\nend";
        let first = convert_text(source).unwrap();
        let second = convert_text(source).unwrap();
        assert!(first.structure_eq(&second));
    }

    #[test]
    fn test_validate_syntax() {
        assert_eq!(
            validate_syntax("print('ok')"),
            Validation {
                valid: true,
                errors: Vec::new()
            }
        );
        let report = validate_syntax("if a then\n    b()");
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["1 block(s) not closed with 'end'"]);

        let report = validate_syntax("local = 1");
        assert!(!report.valid);
        assert!(report.errors[0].contains("line 1"));
    }
}
