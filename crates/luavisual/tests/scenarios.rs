//! End-to-end behaviour of the translator on small scripts.

use luavisual::{
    Config, Graph, GraphNode, SourceHandle, StructureEq, convert_text, generate, graph_to_text,
    text_to_graph, validate_syntax,
};

const COMMAND_WITH_PRINT: &str = "RegisterCommand('hello', function(source, args)\n    print('Hello world')\nend)";

#[test]
fn command_wrapping_print() {
    let graph = convert_text(COMMAND_WITH_PRINT).unwrap();
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);

    let command = &graph.nodes[0];
    assert_eq!(command.kind, "event-start");
    assert_eq!(command.text("commandName").as_deref(), Some("hello"));

    let print = &graph.nodes[1];
    assert_eq!(print.kind, "logic-print");
    assert_eq!(print.text("message").as_deref(), Some("Hello world"));

    let edge = &graph.edges[0];
    assert_eq!(edge.source, command.id);
    assert_eq!(edge.target, print.id);
    assert_eq!(edge.source_handle, SourceHandle::FlowOut);
}

#[test]
fn conditional_with_both_branches() {
    let mut graph = Graph::new(
        vec![
            GraphNode::new("cond", "logic-if").with("condition", "x>5"),
            GraphNode::new("yes", "logic-print").with("message", "yes").at(200.0, 200.0),
            GraphNode::new("no", "logic-print").with("message", "no").at(200.0, 300.0),
        ],
        Vec::new(),
    );
    graph.connect("cond", "yes", SourceHandle::True);
    graph.connect("cond", "no", SourceHandle::False);

    insta::assert_snapshot!(generate(&graph.nodes, &graph.edges, ""), @r"
if x>5 then
    print('yes')
else
    print('no')
end
");
}

#[test]
fn notification_fields() {
    let node = GraphNode::new("n", "qb-notify")
        .with("message", "Hola")
        .with("notifyType", "error");
    assert_eq!(
        generate(&[node], &[], ""),
        "QBCore.Functions.Notify('Hola', 'error')"
    );
}

#[test]
fn command_round_trip_is_structurally_stable() {
    let original = convert_text(COMMAND_WITH_PRINT).unwrap();
    let text = generate(&original.nodes, &original.edges, "");
    assert_eq!(text, COMMAND_WITH_PRINT);

    let again = convert_text(&text).unwrap();
    assert!(original.structure_eq(&again));
    assert_ne!(original.nodes[0].id, again.nodes[0].id);
}

/// A block left open at end of input is accepted, not reported. The balance
/// check is the only place that notices.
#[test]
fn missing_end_is_accepted() {
    let source = "function greet()\n    print('hi')";
    let graph = convert_text(source).unwrap();
    let kinds: Vec<_> = graph.nodes.iter().map(|n| n.kind.as_str()).collect();
    assert_eq!(kinds, vec!["function-def", "logic-print"]);

    let result = text_to_graph(source, &Config::default());
    assert_eq!(result.error, None);
    assert_eq!(result.nodes.len(), 2);

    assert!(!validate_syntax(source).valid);

    let config = Config::default();
    assert_eq!(
        graph_to_text(&graph, "", &config),
        "function greet()\n    print('hi')\nend"
    );
}

#[test]
fn empty_input() {
    let graph = convert_text("").unwrap();
    assert!(graph.is_empty());
    assert!(graph.edges.is_empty());

    let result = text_to_graph("", &Config::default());
    assert!(result.nodes.is_empty());
    assert_eq!(result.header, "");
}

#[test]
fn empty_graph_returns_header() {
    let header = "local QBCore = exports['qb-core']:GetCoreObject()";
    assert_eq!(generate(&[], &[], header), header);
}

#[test]
fn code_block_survives_verbatim() {
    let source = "RegisterCommand('tp', function(source, args)\n    SetEntityCoords(PlayerPedId(), 0.0, 0.0, 72.0, false, false, false, true)\n    local ped = PlayerPedId()\nend)";
    let graph = convert_text(source).unwrap();
    let raw: Vec<_> = graph.nodes.iter().filter_map(|n| n.code_block()).collect();
    assert_eq!(
        raw,
        vec![
            "SetEntityCoords(PlayerPedId(), 0.0, 0.0, 72.0, false, false, false, true)",
            "local ped = PlayerPedId()",
        ]
    );
    assert_eq!(generate(&graph.nodes, &graph.edges, ""), source);
}

#[test]
fn editor_json_generates() {
    let graph: Graph = serde_json::from_str(
        r#"{
            "nodes": [
                {"id": "t", "type": "thread-create", "data": {"label": "Create Thread"}, "position": {"x": 100, "y": 100}},
                {"id": "w", "type": "wait", "data": {"label": "Wait", "duration": "1000"}, "position": {"x": 200, "y": 220}},
                {"id": "n", "type": "esx-notify", "data": {"label": "ESX Notify", "message": "tick"}, "position": {"x": 200, "y": 340}}
            ],
            "edges": [
                {"id": "e1", "sourceId": "t", "targetId": "w"},
                {"id": "e2", "source": "w", "target": "n", "sourceHandle": "flow-out", "targetHandle": "flow-in"}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(
        graph_to_text(&graph, "", &Config::default()),
        "CreateThread(function()\n    Wait(1000)\n    ESX.ShowNotification('tick')\nend)"
    );
}
