//! CLI end-to-end tests.

use assert_cmd::Command;
use tempfile::TempDir;

const SCRIPT: &str = "RegisterCommand('heal', function(source, args)\n    print('healed')\nend)\n";

fn luavisual(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("luavisual").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

fn stdout_of(cmd: &mut Command) -> (Option<i32>, String) {
    let output = cmd.output().expect("failed to execute luavisual");
    (
        output.status.code(),
        String::from_utf8_lossy(&output.stdout).to_string(),
    )
}

#[test]
fn to_graph_prints_document() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("heal.lua"), SCRIPT).unwrap();

    let (code, stdout) = stdout_of(luavisual(&dir).args(["to-graph", "heal.lua", "--compact"]));
    assert_eq!(code, Some(0));

    let document: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let kinds: Vec<_> = document["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["event-start", "logic-print"]);
    assert_eq!(document["header"], "");
    assert!(document.get("error").is_none());
}

#[test]
fn to_graph_reports_parse_error() {
    let dir = TempDir::new().unwrap();
    let output = luavisual(&dir)
        .args(["to-graph", "-"])
        .write_stdin("local = 1")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 1"), "{stderr}");
}

#[test]
fn graph_document_back_to_text() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("heal.lua"), SCRIPT).unwrap();
    let (_, json) = stdout_of(luavisual(&dir).args(["to-graph", "heal.lua", "-o", "heal.json"]));
    assert_eq!(json, "");

    let (code, text) = stdout_of(luavisual(&dir).args(["to-text", "heal.json"]));
    assert_eq!(code, Some(0));
    assert_eq!(text, SCRIPT);
}

#[test]
fn to_text_with_header_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("header.lua"), "local QBCore = exports['qb-core']:GetCoreObject()\n").unwrap();
    let graph = r#"{"nodes": [{"id": "w", "type": "wait", "data": {"duration": "10"}}], "edges": []}"#;

    let (code, text) = stdout_of(
        luavisual(&dir)
            .args(["to-text", "-", "--header", "header.lua"])
            .write_stdin(graph),
    );
    assert_eq!(code, Some(0));
    assert_eq!(text, "local QBCore = exports['qb-core']:GetCoreObject()\n\nWait(10)\n");
}

#[test]
fn roundtrip_uses_project_config() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".luavisual")).unwrap();
    std::fs::write(dir.path().join(".luavisual/config.toml"), "[generator]\nindent = \"  \"\n").unwrap();

    let (code, text) = stdout_of(luavisual(&dir).args(["roundtrip", "-"]).write_stdin(SCRIPT));
    assert_eq!(code, Some(0));
    assert_eq!(text, "RegisterCommand('heal', function(source, args)\n  print('healed')\nend)\n");
}

#[test]
fn explicit_config_must_parse() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bad.toml"), "[layout]\nstart_x = \"left\"\n").unwrap();
    let output = luavisual(&dir)
        .args(["--config", "bad.toml", "check", "-"])
        .write_stdin("print('x')")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("bad.toml"));
}

#[test]
fn check_reports_unbalanced_blocks() {
    let dir = TempDir::new().unwrap();
    let (code, stdout) = stdout_of(luavisual(&dir).args(["check", "-"]).write_stdin("print('ok')"));
    assert_eq!(code, Some(0));
    assert_eq!(stdout, "-: ok\n");

    let (code, stdout) = stdout_of(
        luavisual(&dir)
            .args(["check", "-"])
            .write_stdin("if ready then\n    go()"),
    );
    assert_eq!(code, Some(1));
    assert_eq!(stdout, "-: 1 block(s) not closed with 'end'\n");
}
