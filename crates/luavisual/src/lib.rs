//! Bidirectional translation between FiveM Lua scripts and node graphs.
//!
//! # Architecture
//!
//! ```text
//!            split_source          luavisual_syntax           Converter
//! text ──> header + body ──> tokens ──> Program ──────────────────────> Graph
//!                                                                         │
//! text <── balance <── Emitter (block stack) <── GraphView <── Generator <┘
//! ```
//!
//! Recognized runtime calls (command and event registrations, threads,
//! notifications, text drawing natives, ...) become typed nodes with named
//! fields, described once in the [`catalog`] and used in both directions.
//! Anything else is kept as raw text in a `codeBlock` field and written back
//! unchanged.
//!
//! # Example
//!
//! ```
//! use luavisual::{Config, graph_to_text, text_to_graph};
//!
//! let source = "RegisterCommand('heal', function(source, args)\n    print('healed')\nend)";
//! let config = Config::default();
//! let result = text_to_graph(source, &config);
//! assert_eq!(result.nodes.len(), 2);
//! assert_eq!(graph_to_text(&result.graph(), &result.header, &config), source);
//! ```

pub mod api;
pub mod balance;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod generate;
pub mod graph;
pub mod header;
pub mod kind;
pub mod structure_eq;

pub use api::{TextToGraph, Validation, convert_text, graph_to_text, text_to_graph, validate_syntax};
pub use catalog::{CatalogEntry, ENTRIES};
pub use config::{Config, ConfigError, GeneratorConfig, LayoutConfig, ParserConfig};
pub use convert::{Converter, convert};
pub use generate::{GenerateError, Generated, Generator, generate};
pub use graph::{Graph, GraphEdge, GraphNode, GraphView, Position, SourceHandle};
pub use header::{SourceParts, extract_header, split_source};
pub use kind::NodeKind;
pub use luavisual_syntax::{ParseError, Program};
pub use structure_eq::{StructureEq, StructureStep};
