//! Semantic catalog: recognized runtime calls and their node kinds.
//!
//! Each [`CatalogEntry`] describes one call shape in both directions. The
//! converter uses [`match_call`] to turn a call into a node with named
//! fields; the generator uses [`entry_for_node`] and the same argument
//! layout to write the call back. A call whose arguments do not fit the
//! layout (a non-literal where a quoted string is expected, extra
//! arguments, ...) is not matched and falls back to verbatim code.

use luavisual_syntax::{Expr, Stmt};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::graph::GraphNode;

/// How an argument is stored in node data and written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStyle {
    /// String literal. Data holds the content; emitted single-quoted.
    Quoted,
    /// Any single-line expression, stored and emitted as source text.
    Raw,
    /// All remaining arguments, joined with `, `.
    Rest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub style: FieldStyle,
    /// Emitted when the node has no usable value.
    pub default: &'static str,
    /// Optional trailing argument: may be absent in source and is omitted
    /// on output when the node has no value for it.
    pub optional: bool,
}

/// Anonymous function argument whose body becomes the node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerSpec {
    /// Parameter list used when the node does not record one.
    pub params: &'static str,
    /// The call is also valid without a handler (`RegisterNetEvent('x')`).
    pub optional: bool,
}

/// Data key holding a handler's parameter list.
pub const PARAMS: &str = "params";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    Field(FieldSpec),
    Handler(HandlerSpec),
}

#[derive(Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub kind: &'static str,
    pub title: &'static str,
    /// Accepted callee spellings; the first is written on output.
    pub callees: &'static [&'static str],
    pub args: &'static [Arg],
    /// Constant data distinguishing entries that share a kind.
    pub fixed: &'static [(&'static str, &'static str)],
    /// Marks a root-level action for the header splitter.
    pub root: bool,
}

impl CatalogEntry {
    pub fn canonical_callee(&self) -> &'static str {
        self.callees[0]
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.args.iter().filter_map(|a| match a {
            Arg::Field(f) => Some(f),
            Arg::Handler(_) => None,
        })
    }
}

const fn quoted(name: &'static str, default: &'static str) -> Arg {
    Arg::Field(FieldSpec {
        name,
        style: FieldStyle::Quoted,
        default,
        optional: false,
    })
}

const fn quoted_opt(name: &'static str) -> Arg {
    Arg::Field(FieldSpec {
        name,
        style: FieldStyle::Quoted,
        default: "",
        optional: true,
    })
}

const fn raw(name: &'static str, default: &'static str) -> Arg {
    Arg::Field(FieldSpec {
        name,
        style: FieldStyle::Raw,
        default,
        optional: false,
    })
}

const fn raw_opt(name: &'static str) -> Arg {
    Arg::Field(FieldSpec {
        name,
        style: FieldStyle::Raw,
        default: "",
        optional: true,
    })
}

const fn rest(name: &'static str) -> Arg {
    Arg::Field(FieldSpec {
        name,
        style: FieldStyle::Rest,
        default: "",
        optional: true,
    })
}

const fn handler(params: &'static str) -> Arg {
    Arg::Handler(HandlerSpec {
        params,
        optional: false,
    })
}

const fn handler_opt(params: &'static str) -> Arg {
    Arg::Handler(HandlerSpec {
        params,
        optional: true,
    })
}

macro_rules! entry {
    ($kind:literal, $title:literal, [$($callee:expr),+], [$($arg:expr),*]) => {
        entry!($kind, $title, [$($callee),+], [$($arg),*], [], false)
    };
    ($kind:literal, $title:literal, [$($callee:expr),+], [$($arg:expr),*], root) => {
        entry!($kind, $title, [$($callee),+], [$($arg),*], [], true)
    };
    ($kind:literal, $title:literal, [$($callee:expr),+], [$($arg:expr),*], [$($fixed:expr),*], $root:expr) => {
        CatalogEntry {
            kind: $kind,
            title: $title,
            callees: &[$($callee),+],
            args: &[$($arg),*],
            fixed: &[$($fixed),*],
            root: $root,
        }
    };
}

/// Every recognized call, in lookup order.
pub static ENTRIES: &[CatalogEntry] = &[
    // Registrations (root-level actions)
    entry!("event-start", "Register Command", ["RegisterCommand"],
        [quoted("commandName", "mycommand"), handler("source, args"), raw_opt("restricted")], root),
    entry!("register-net", "Register Net Event", ["RegisterNetEvent"],
        [quoted("eventName", "myevent"), handler_opt("...")], root),
    entry!("add-event-handler", "Event Handler", ["AddEventHandler"],
        [quoted("eventName", "myevent"), handler("...")], root),
    entry!("thread-create", "Create Thread", ["CreateThread", "Citizen.CreateThread"],
        [handler("")], root),
    entry!("qb-command", "QBCore Command", ["QBCore.Commands.Add"],
        [quoted("commandName", "mycommand"), quoted("help", "Command help"),
         raw("arguments", "{}"), raw("argsRequired", "false"), handler("source, args"),
         raw_opt("permission")], root),
    entry!("qb-create-callback", "Create Callback", ["QBCore.Functions.CreateCallback"],
        [quoted("callbackName", "mycallback"), handler("source, cb")], root),
    entry!("register-key-mapping", "Key Mapping", ["RegisterKeyMapping"],
        [quoted("commandName", "mycommand"), quoted("description", "Key mapping"),
         quoted("mapper", "keyboard"), quoted("key", "F5")], root),
    // Flow
    entry!("qb-trigger-callback", "Trigger Callback", ["QBCore.Functions.TriggerCallback"],
        [quoted("callbackName", "mycallback"), handler("result"), rest("arguments")]),
    entry!("logic-print", "Print", ["print"], [quoted("message", "Hello")]),
    entry!("wait", "Wait", ["Wait", "Citizen.Wait"], [raw("duration", "0")]),
    entry!("event-trigger", "Trigger Event", ["TriggerEvent"],
        [quoted("eventName", "myevent"), rest("arguments")], [("eventType", "local")], false),
    entry!("event-trigger", "Trigger Event", ["TriggerServerEvent"],
        [quoted("eventName", "myevent"), rest("arguments")], [("eventType", "server")], false),
    entry!("event-trigger", "Trigger Event", ["TriggerClientEvent"],
        [quoted("eventName", "myevent"), rest("arguments")], [("eventType", "client")], false),
    // Framework UI
    entry!("qb-notify", "QBCore Notify", ["QBCore.Functions.Notify"],
        [quoted("message", "Notification"), quoted_opt("notifyType"), raw_opt("length")]),
    entry!("qb-drawtext-show", "Show DrawText",
        ["exports['qb-core']:DrawText", "exports[\"qb-core\"]:DrawText"],
        [quoted("text", "Text"), quoted_opt("position")]),
    entry!("qb-drawtext-hide", "Hide DrawText",
        ["exports['qb-core']:HideText", "exports[\"qb-core\"]:HideText"], []),
    entry!("qb-drawtext-3d", "DrawText 3D", ["QBCore.Functions.DrawText3D"],
        [raw("x", "0.0"), raw("y", "0.0"), raw("z", "0.0"), quoted("text", "Text")]),
    entry!("qb-delete-vehicle", "Delete Vehicle", ["QBCore.Functions.DeleteVehicle"],
        [raw("vehicle", "vehicle")]),
    entry!("esx-notify", "ESX Notify", ["ESX.ShowNotification"],
        [quoted("message", "Notification"), quoted_opt("notifyType"), raw_opt("length")]),
    // Native text drawing
    entry!("begin-text-command", "Begin Text", ["BeginTextCommandDisplayText"],
        [quoted("textType", "STRING")]),
    entry!("add-text-component", "Add Text", ["AddTextComponentSubstringPlayerName"],
        [quoted("text", "Text")]),
    entry!("end-text-command", "End Text", ["EndTextCommandDisplayText"],
        [raw("x", "0.5"), raw("y", "0.5")]),
    entry!("set-text-font", "Text Font", ["SetTextFont"], [raw("font", "4")]),
    entry!("set-text-scale", "Text Scale", ["SetTextScale"],
        [raw("scaleX", "0.5"), raw("scaleY", "0.5")]),
    entry!("set-text-colour", "Text Colour", ["SetTextColour"],
        [raw("r", "255"), raw("g", "255"), raw("b", "255"), raw("a", "255")]),
    entry!("draw-rect", "Draw Rect", ["DrawRect"],
        [raw("x", "0.5"), raw("y", "0.5"), raw("width", "0.1"), raw("height", "0.1"),
         raw("r", "255"), raw("g", "255"), raw("b", "255"), raw("a", "255")]),
    // Screen and tasks
    entry!("do-screen-fade-in", "Fade In", ["DoScreenFadeIn"], [raw("duration", "1000")]),
    entry!("do-screen-fade-out", "Fade Out", ["DoScreenFadeOut"], [raw("duration", "1000")]),
    entry!("clear-ped-tasks", "Clear Tasks", ["ClearPedTasks"], [raw("ped", "PlayerPedId()")]),
];

/// Callee spelling to entry. Dotted and method spellings are inserted first
/// so they win over a bare name should both ever be registered.
fn index() -> &'static HashMap<&'static str, &'static CatalogEntry> {
    static INDEX: OnceLock<HashMap<&'static str, &'static CatalogEntry>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut callees: Vec<(&'static str, &'static CatalogEntry)> = ENTRIES
            .iter()
            .flat_map(|e| e.callees.iter().map(move |c| (*c, e)))
            .collect();
        callees.sort_by_key(|(c, _)| !c.contains(['.', ':']));
        let mut index = HashMap::new();
        for (callee, entry) in callees {
            index.entry(callee).or_insert(entry);
        }
        index
    })
}

/// Entry for an exact callee spelling.
pub fn lookup(callee: &str) -> Option<&'static CatalogEntry> {
    index().get(callee).copied()
}

/// Entries of a node kind, in table order.
pub fn entries_for_kind(kind: &str) -> impl Iterator<Item = &'static CatalogEntry> + '_ {
    ENTRIES.iter().filter(move |e| e.kind == kind)
}

/// Entry used to write `node` back: the first entry of its kind whose fixed
/// fields all agree with the node's data. A node without the
/// distinguishing fields gets the first entry of its kind.
pub fn entry_for_node(node: &GraphNode) -> Option<&'static CatalogEntry> {
    let mut candidates = entries_for_kind(&node.kind).peekable();
    let first = *candidates.peek()?;
    candidates
        .find(|e| {
            e.fixed
                .iter()
                .all(|(key, value)| node.text(key).as_deref() == Some(*value))
        })
        .or(Some(first))
}

/// Callees that start a root-level action.
pub fn root_callees() -> impl Iterator<Item = &'static str> {
    ENTRIES
        .iter()
        .filter(|e| e.root)
        .flat_map(|e| e.callees.iter().copied())
}

/// A call recognized by the catalog.
#[derive(Debug)]
pub struct CallMatch<'a> {
    pub entry: &'static CatalogEntry,
    /// Extracted fields (plus fixed fields and handler params), in layout
    /// order.
    pub fields: Map<String, Value>,
    pub handler_body: Option<&'a [Stmt]>,
}

/// Source spelling of a call's callee and its arguments, for plain and
/// method calls.
pub fn split_call(expr: &Expr) -> Option<(String, &[Expr])> {
    match expr {
        Expr::FunctionCall { callee, args } => Some((callee.to_string(), args.as_slice())),
        Expr::MethodCall {
            object,
            method,
            args,
        } => Some((format!("{object}:{method}"), args.as_slice())),
        _ => None,
    }
}

/// Match a call against the catalog.
pub fn match_call<'a>(callee: &str, args: &'a [Expr]) -> Option<CallMatch<'a>> {
    let entry = lookup(callee)?;
    let mut fields = Map::new();
    let mut handler_body = None;
    let mut remaining = args;

    for arg in entry.args {
        match arg {
            Arg::Handler(shape) => match remaining.first() {
                Some(Expr::AnonymousFunction { params, body }) => {
                    fields.insert(PARAMS.to_string(), Value::String(params.join(", ")));
                    handler_body = Some(body.as_slice());
                    remaining = &remaining[1..];
                }
                None if shape.optional => {}
                _ => return None,
            },
            Arg::Field(field) => match field.style {
                FieldStyle::Rest => {
                    if remaining.iter().any(is_function) {
                        return None;
                    }
                    let text = remaining
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    if !text.is_empty() {
                        fields.insert(field.name.to_string(), Value::String(text));
                    }
                    remaining = &[];
                }
                FieldStyle::Quoted => match remaining.first() {
                    Some(expr) => {
                        let value = expr.as_str_literal()?;
                        fields.insert(field.name.to_string(), Value::String(value.to_string()));
                        remaining = &remaining[1..];
                    }
                    None if field.optional => {}
                    None => return None,
                },
                FieldStyle::Raw => match remaining.first() {
                    Some(expr) if !is_function(expr) => {
                        fields.insert(field.name.to_string(), Value::String(expr.to_string()));
                        remaining = &remaining[1..];
                    }
                    None if field.optional => {}
                    _ => return None,
                },
            },
        }
    }

    if !remaining.is_empty() {
        return None;
    }

    for (key, value) in entry.fixed {
        fields.insert(key.to_string(), Value::String(value.to_string()));
    }

    Some(CallMatch {
        entry,
        fields,
        handler_body,
    })
}

fn is_function(expr: &Expr) -> bool {
    matches!(expr, Expr::AnonymousFunction { .. })
}

/// Quote `value` as a single-quoted string literal. Quotes already escaped
/// in `value` are kept as they are.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push_str("\\\\"),
            },
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Source text for a catalog node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallText {
    /// A complete single-line call.
    Line(String),
    /// A call with a handler: the opener ends with `function(params)`, the
    /// closer starts with `end`. Children go between the two.
    Block { opener: String, closer: String },
}

/// Write a catalog node back as a call. An optional handler is written only
/// when the node records its parameter list.
pub fn emit_call(entry: &CatalogEntry, node: &GraphNode) -> CallText {
    let mut before: Vec<String> = Vec::new();
    let mut after: Vec<String> = Vec::new();
    let mut handler_params: Option<String> = None;

    for arg in entry.args {
        let args = if handler_params.is_some() {
            &mut after
        } else {
            &mut before
        };
        match arg {
            Arg::Handler(shape) => {
                let recorded = node.text(PARAMS);
                if recorded.is_none() && shape.optional {
                    continue;
                }
                handler_params = Some(recorded.unwrap_or_else(|| shape.params.to_string()));
            }
            Arg::Field(field) => {
                let value = node.text(field.name);
                match field.style {
                    FieldStyle::Quoted => match value {
                        Some(v) => args.push(quote(&v)),
                        None if field.optional => {}
                        None => args.push(quote(field.default)),
                    },
                    FieldStyle::Raw | FieldStyle::Rest => match value {
                        Some(v) if !v.trim().is_empty() => args.push(v),
                        _ if field.optional => {}
                        _ => args.push(field.default.to_string()),
                    },
                }
            }
        }
    }

    let callee = entry.canonical_callee();
    match handler_params {
        None => CallText::Line(format!("{callee}({})", before.join(", "))),
        Some(params) => {
            let mut opener = format!("{callee}(");
            for arg in &before {
                opener.push_str(arg);
                opener.push_str(", ");
            }
            opener.push_str(&format!("function({params})"));

            let mut closer = String::from("end");
            for arg in &after {
                closer.push_str(", ");
                closer.push_str(arg);
            }
            closer.push(')');
            CallText::Block { opener, closer }
        }
    }
}
