//! Parser and printer behaviour on realistic FiveM script fragments.

use luavisual_syntax::{Expr, ParseError, Program, StmtKind, parse, parse_recovering, tokenize};

fn parse_src(code: &str) -> Program {
    parse(&tokenize(code)).expect("parse failed")
}

// ============================================================================
// AST shape
// ============================================================================

mod ast_shape {
    use super::*;

    #[test]
    fn local_declaration() {
        insta::assert_json_snapshot!(parse_src("local x = 42"), @r#"
        {
          "body": [
            {
              "line": 1,
              "kind": {
                "type": "LocalDeclaration",
                "name": "x",
                "value": {
                  "type": "NumberLiteral",
                  "value": "42"
                }
              }
            }
          ]
        }
        "#);
    }

    #[test]
    fn string_keeps_quote() {
        insta::assert_json_snapshot!(parse_src("print(\"hi\")"), @r#"
        {
          "body": [
            {
              "line": 1,
              "kind": {
                "type": "ExpressionStatement",
                "expr": {
                  "type": "FunctionCall",
                  "callee": {
                    "type": "Identifier",
                    "name": "print"
                  },
                  "args": [
                    {
                      "type": "StringLiteral",
                      "value": "hi",
                      "quote": "\""
                    }
                  ]
                }
              }
            }
          ]
        }
        "#);
    }

    #[test]
    fn register_command_with_handler() {
        let program = parse_src(
            "RegisterCommand('heal', function(source, args)\n    SetEntityHealth(PlayerPedId(), 200)\nend, false)",
        );
        let StmtKind::ExpressionStatement {
            expr: Expr::FunctionCall { callee, args },
        } = &program.body[0].kind
        else {
            panic!("expected a call statement");
        };
        assert_eq!(callee.to_string(), "RegisterCommand");
        assert_eq!(args.len(), 3);
        assert_eq!(args[0].as_str_literal(), Some("heal"));
        match &args[1] {
            Expr::AnonymousFunction { params, body } => {
                assert_eq!(params, &["source", "args"]);
                assert_eq!(body.len(), 1);
                assert_eq!(body[0].line, 2);
            }
            other => panic!("expected handler function, got {other:?}"),
        }
    }

    #[test]
    fn net_event_handler() {
        let program = parse_src(
            "RegisterNetEvent('bank:deposit')\nAddEventHandler('bank:deposit', function(amount)\n    if amount > 0 then\n        TriggerServerEvent('bank:save', amount)\n    end\nend)",
        );
        assert_eq!(program.body.len(), 2);
        assert_eq!(program.body[1].line, 2);
    }
}

// ============================================================================
// Printing
// ============================================================================

mod printing {
    use super::*;

    #[test]
    fn whole_script_is_stable() {
        let source = "local QBCore = exports['qb-core']:GetCoreObject()\n\
                      local function notify(msg)\n    QBCore.Functions.Notify(msg, 'success')\nend\n\
                      CreateThread(function()\n    while true do\n        Wait(1000)\n        notify('tick ' .. GetGameTimer())\n    end\nend)";
        let printed = parse_src(source).to_string();
        assert_eq!(printed, source);
        assert_eq!(parse_src(&printed).to_string(), printed);
    }

    #[test]
    fn normalizes_spacing_and_optional_keywords() {
        assert_eq!(
            parse_src("if  x==1  y( )  end").to_string(),
            "if x == 1 then\n    y()\nend"
        );
    }
}

// ============================================================================
// Errors
// ============================================================================

mod errors {
    use super::*;

    #[test]
    fn reports_first_error_line() {
        let err = parse(&tokenize("local a = 1\nprint(a\nlocal b = 2")).unwrap_err();
        assert_eq!(err.line(), 3);
        assert!(matches!(err, ParseError::Expected { .. }));
    }

    #[test]
    fn rejects_assignment_to_call() {
        let err = parse(&tokenize("f() = 1")).unwrap_err();
        assert!(matches!(err, ParseError::Unexpected { .. }));
    }

    #[test]
    fn missing_end_at_eof_is_accepted() {
        let program = parse_src("CreateThread(function()\n    Wait(0)\nend)\nwhile true do\n    Wait(0)\n");
        assert_eq!(program.body.len(), 2);
        assert!(matches!(program.body[1].kind, StmtKind::WhileLoop { .. }));
    }

    #[test]
    fn recovery_keeps_good_statements() {
        let recovered = parse_recovering(
            &tokenize("local a = 1\nlocal b = * 2\nlocal c = 3\nend\nlocal d = 4"),
            10,
        )
        .unwrap();
        assert_eq!(recovered.program.body.len(), 3);
        let lines: Vec<_> = recovered.errors.iter().map(ParseError::line).collect();
        assert_eq!(lines, vec![2, 4]);
    }
}
