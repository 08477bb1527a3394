//! Deterministic source printing for AST nodes.
//!
//! Expressions are printed with the minimum parentheses their precedence
//! requires, so `(a + b) * c` survives a round trip while `a + b * c` does
//! not grow extra parentheses. Multi-line constructs (anonymous functions)
//! indent relative to the line they start on.

use crate::ast::*;
use std::fmt;

/// Default indentation unit for printed blocks.
pub const DEFAULT_INDENT: &str = "    ";

/// Accumulates printed source.
pub struct Printer<'a> {
    output: String,
    indent: usize,
    unit: &'a str,
}

impl<'a> Printer<'a> {
    pub fn new(unit: &'a str) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            unit,
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    fn line_break(&mut self) {
        self.output.push('\n');
        for _ in 0..self.indent {
            self.output.push_str(self.unit);
        }
    }

    fn write_block(&mut self, body: &[Stmt]) {
        self.indent += 1;
        for stmt in body {
            self.line_break();
            self.write_stmt(stmt);
        }
        self.indent -= 1;
        self.line_break();
    }

    pub fn write_program(&mut self, program: &Program) {
        for (i, stmt) in program.body.iter().enumerate() {
            if i > 0 {
                self.line_break();
            }
            self.write_stmt(stmt);
        }
    }

    pub fn write_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::LocalDeclaration { name, value } => {
                self.output.push_str("local ");
                self.output.push_str(name);
                if let Some(value) = value {
                    self.output.push_str(" = ");
                    self.write_expr(value);
                }
            }

            StmtKind::Assignment { target, op, value } => {
                self.write_expr(target);
                self.output.push(' ');
                self.output.push_str(op);
                self.output.push(' ');
                self.write_expr(value);
            }

            StmtKind::FunctionDeclaration {
                name,
                params,
                body,
                is_local,
                ..
            } => {
                if *is_local {
                    self.output.push_str("local ");
                }
                self.output.push_str("function ");
                self.output.push_str(name);
                self.write_params(params);
                self.write_block(body);
                self.output.push_str("end");
            }

            StmtKind::IfStatement { .. } => {
                self.output.push_str("if ");
                self.write_if_tail(stmt);
            }

            StmtKind::WhileLoop { condition, body } => {
                self.output.push_str("while ");
                self.write_expr(condition);
                self.output.push_str(" do");
                self.write_block(body);
                self.output.push_str("end");
            }

            StmtKind::ForLoop {
                variable,
                start,
                end,
                step,
                body,
            } => {
                self.output.push_str("for ");
                self.output.push_str(variable);
                self.output.push_str(" = ");
                self.write_expr(start);
                self.output.push_str(", ");
                self.write_expr(end);
                if let Some(step) = step {
                    self.output.push_str(", ");
                    self.write_expr(step);
                }
                self.output.push_str(" do");
                self.write_block(body);
                self.output.push_str("end");
            }

            StmtKind::ForInLoop {
                variables,
                iterable,
                body,
            } => {
                self.output.push_str("for ");
                self.output.push_str(&variables.join(", "));
                self.output.push_str(" in ");
                self.write_expr(iterable);
                self.output.push_str(" do");
                self.write_block(body);
                self.output.push_str("end");
            }

            StmtKind::ReturnStatement { values } => {
                self.output.push_str("return");
                if !values.is_empty() {
                    self.output.push(' ');
                    self.write_list(values);
                }
            }

            StmtKind::Break => self.output.push_str("break"),

            StmtKind::ExpressionStatement { expr } => self.write_expr(expr),
        }
    }

    /// Everything after the `if`/`elseif` keyword.
    fn write_if_tail(&mut self, stmt: &Stmt) {
        let StmtKind::IfStatement {
            condition,
            consequent,
            alternate,
        } = &stmt.kind
        else {
            return;
        };

        self.write_expr(condition);
        self.output.push_str(" then");
        self.write_block(consequent);

        match alternate.as_deref() {
            Some([nested]) if matches!(nested.kind, StmtKind::IfStatement { .. }) => {
                self.output.push_str("elseif ");
                self.write_if_tail(nested);
            }
            Some(alternate) => {
                self.output.push_str("else");
                self.write_block(alternate);
                self.output.push_str("end");
            }
            None => self.output.push_str("end"),
        }
    }

    fn write_params(&mut self, params: &[String]) {
        self.output.push('(');
        self.output.push_str(&params.join(", "));
        self.output.push(')');
    }

    fn write_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.write_expr(expr);
        }
    }

    pub fn write_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Identifier { name } => self.output.push_str(name),
            Expr::StringLiteral { value, quote } => {
                self.output.push(*quote);
                self.output.push_str(value);
                self.output.push(*quote);
            }
            Expr::NumberLiteral { value } => self.output.push_str(value),
            Expr::BooleanLiteral { value } => {
                self.output.push_str(if *value { "true" } else { "false" })
            }
            Expr::NilLiteral => self.output.push_str("nil"),
            Expr::Vararg => self.output.push_str("..."),

            Expr::BinaryExpression { op, left, right } => {
                let prec = op.precedence();
                let (left_min, right_min) = if op.is_right_assoc() {
                    (prec + 1, prec)
                } else {
                    (prec, prec + 1)
                };
                self.write_operand(left, left_min);
                self.output.push(' ');
                self.output.push_str(op.symbol());
                self.output.push(' ');
                self.write_operand(right, right_min);
            }

            Expr::UnaryExpression { op, operand } => {
                self.output.push_str(op.symbol());
                if *op == UnaryOp::Not {
                    self.output.push(' ');
                }
                let start = self.output.len();
                self.write_operand(operand, UnaryOp::PRECEDENCE);
                // `- -x` must not collapse into a comment.
                if *op == UnaryOp::Neg && self.output[start..].starts_with('-') {
                    self.output.insert(start, ' ');
                }
            }

            Expr::FunctionCall { callee, args } => {
                self.write_prefix(callee);
                self.output.push('(');
                self.write_list(args);
                self.output.push(')');
            }

            Expr::MethodCall {
                object,
                method,
                args,
            } => {
                self.write_prefix(object);
                self.output.push(':');
                self.output.push_str(method);
                self.output.push('(');
                self.write_list(args);
                self.output.push(')');
            }

            Expr::MemberExpression { object, property } => {
                self.write_prefix(object);
                self.output.push('.');
                self.output.push_str(property);
            }

            Expr::IndexExpression { object, index } => {
                self.write_prefix(object);
                self.output.push('[');
                self.write_expr(index);
                self.output.push(']');
            }

            Expr::TableConstructor { fields } => {
                self.output.push('{');
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    match field {
                        TableField::Named { name, value } => {
                            self.output.push_str(name);
                            self.output.push_str(" = ");
                            self.write_expr(value);
                        }
                        TableField::Keyed { key, value } => {
                            self.output.push('[');
                            self.write_expr(key);
                            self.output.push_str("] = ");
                            self.write_expr(value);
                        }
                        TableField::Positional { value } => self.write_expr(value),
                    }
                }
                self.output.push('}');
            }

            Expr::AnonymousFunction { params, body } => {
                self.output.push_str("function");
                self.write_params(params);
                if body.is_empty() {
                    self.output.push_str(" end");
                } else {
                    self.write_block(body);
                    self.output.push_str("end");
                }
            }
        }
    }

    /// Write `expr`, parenthesized if it binds looser than `min_prec`.
    fn write_operand(&mut self, expr: &Expr, min_prec: u8) {
        let prec = match expr {
            Expr::BinaryExpression { op, .. } => op.precedence(),
            Expr::UnaryExpression { .. } => UnaryOp::PRECEDENCE,
            _ => u8::MAX,
        };
        if prec < min_prec {
            self.output.push('(');
            self.write_expr(expr);
            self.output.push(')');
        } else {
            self.write_expr(expr);
        }
    }

    /// Write the object of a call/index/member access. Only names, accesses
    /// and calls can appear there unparenthesized.
    fn write_prefix(&mut self, expr: &Expr) {
        let bare = matches!(
            expr,
            Expr::Identifier { .. }
                | Expr::MemberExpression { .. }
                | Expr::IndexExpression { .. }
                | Expr::FunctionCall { .. }
                | Expr::MethodCall { .. }
        );
        if bare {
            self.write_expr(expr);
        } else {
            self.output.push('(');
            self.write_expr(expr);
            self.output.push(')');
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer::new(DEFAULT_INDENT);
        printer.write_expr(self);
        f.write_str(&printer.finish())
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer::new(DEFAULT_INDENT);
        printer.write_stmt(self);
        f.write_str(&printer.finish())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer::new(DEFAULT_INDENT);
        printer.write_program(self);
        f.write_str(&printer.finish())
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse, tokenize};

    fn roundtrip(source: &str) -> String {
        parse(&tokenize(source)).unwrap().to_string()
    }

    #[test]
    fn test_keeps_required_parens() {
        assert_eq!(roundtrip("x = (a + b) * c"), "x = (a + b) * c");
        assert_eq!(roundtrip("x = a + b * c"), "x = a + b * c");
        assert_eq!(roundtrip("x = a - (b - c)"), "x = a - (b - c)");
        assert_eq!(roundtrip("x = (a .. b) .. c"), "x = (a .. b) .. c");
        assert_eq!(roundtrip("x = a .. b .. c"), "x = a .. b .. c");
    }

    #[test]
    fn test_unary() {
        assert_eq!(roundtrip("x = not ready"), "x = not ready");
        assert_eq!(roundtrip("x = #list + 1"), "x = #list + 1");
        assert_eq!(roundtrip("x = -(a + b)"), "x = -(a + b)");
        assert_eq!(roundtrip("x = - -a"), "x = - -a");
    }

    #[test]
    fn test_calls_and_access() {
        assert_eq!(
            roundtrip("exports['qb-core']:DrawText('Hi', 'left')"),
            "exports['qb-core']:DrawText('Hi', 'left')"
        );
        assert_eq!(
            roundtrip("local ped = GetPlayerPed(-1)"),
            "local ped = GetPlayerPed(-1)"
        );
        assert_eq!(roundtrip("a.b.c(d[1])"), "a.b.c(d[1])");
    }

    #[test]
    fn test_table_constructor() {
        assert_eq!(
            roundtrip("local t = {x = 1, [\"k\"] = 2, 3}"),
            "local t = {x = 1, [\"k\"] = 2, 3}"
        );
        assert_eq!(roundtrip("local t = {}"), "local t = {}");
    }

    #[test]
    fn test_multiline_function_body() {
        let source = "local cb = function(a)\n    print(a)\nend";
        assert_eq!(roundtrip(source), source);
        assert_eq!(roundtrip("local f = function() end"), "local f = function() end");
    }

    #[test]
    fn test_elseif_chain_prints_flat() {
        let source = "if a then\n    x()\nelseif b then\n    y()\nelse\n    z()\nend";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_loops() {
        let source = "for i = 1, 10, 2 do\n    Wait(i)\nend\nfor k, v in pairs(t) do\n    print(k)\nend\nwhile true do\n    break\nend";
        assert_eq!(roundtrip(source), source);
    }
}
